//! Optional convenience outputs written after a successful extraction.

use framegrab_config::OutputConfig;
use framegrab_core::Payload;
use framegrab_media::{decode_data_uri, detect_mime_type};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Where to persist the decoded frame image and the data-URI text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactTargets {
    pub frame_path: Option<PathBuf>,
    pub payload_path: Option<PathBuf>,
}

impl ArtifactTargets {
    pub fn is_empty(&self) -> bool {
        self.frame_path.is_none() && self.payload_path.is_none()
    }
}

impl From<&OutputConfig> for ArtifactTargets {
    fn from(cfg: &OutputConfig) -> Self {
        Self {
            frame_path: cfg.frame_path.clone(),
            payload_path: cfg.payload_path.clone(),
        }
    }
}

/// Write the configured artifacts. Failures are logged, never returned;
/// the paths actually written are.
pub async fn persist_artifacts(payload: &Payload, targets: &ArtifactTargets) -> Vec<PathBuf> {
    let mut written = Vec::new();

    if let Some(path) = &targets.frame_path {
        match decode_data_uri(payload.as_str()) {
            Some((mime, bytes)) => {
                let by_ext = detect_mime_type(path);
                if by_ext != mime {
                    warn!(path = %path.display(), expected = %mime, "Frame file extension does not match its format");
                }
                if write(path, &bytes).await {
                    written.push(path.clone());
                }
            }
            None => warn!("Payload is not a base64 data URI; frame file skipped"),
        }
    }

    if let Some(path) = &targets.payload_path {
        if write(path, payload.as_str().as_bytes()).await {
            written.push(path.clone());
        }
    }

    written
}

async fn write(path: &Path, bytes: &[u8]) -> bool {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            warn!(path = %parent.display(), error = %e, "Failed to create artifact directory");
            return false;
        }
    }
    match fs::write(path, bytes).await {
        Ok(()) => {
            info!(path = %path.display(), bytes = bytes.len(), "Saved artifact");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to save artifact");
            false
        }
    }
}
