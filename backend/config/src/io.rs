//! Config file location and loading.

use crate::schema::FramegrabConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "framegrab.yaml";

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FRAMEGRAB_CONFIG";

/// Resolve the config file path.
/// Priority: explicit path > `FRAMEGRAB_CONFIG` env > `./framegrab.yaml`
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<FramegrabConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(FramegrabConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse YAML text; an empty document is the default config.
pub fn parse_config(raw: &str) -> Result<FramegrabConfig> {
    if raw.trim().is_empty() {
        return Ok(FramegrabConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

/// Render a config as YAML for display.
pub fn render_config(config: &FramegrabConfig) -> Result<String> {
    serde_yaml::to_string(config).context("Failed to serialize config to YAML")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let p = config_file_path(Some(Path::new("/etc/framegrab.yaml")));
        assert_eq!(p, PathBuf::from("/etc/framegrab.yaml"));
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(parse_config("  \n").unwrap(), FramegrabConfig::default());
    }

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(cfg, FramegrabConfig::default());
    }

    #[tokio::test]
    async fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("framegrab.yaml");
        tokio::fs::write(&path, "logging:\n  level: debug\n").await.unwrap();
        let cfg = load_config(&path).await.unwrap();
        assert_eq!(cfg.logging.unwrap().level.as_deref(), Some("debug"));
    }
}
