use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::types::FetchWindow;

/// Why a frame extraction did not produce a payload.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("remote did not report a usable size for {url}")]
    SizeUnknown { url: String },

    #[error("range fetch {window} failed with HTTP {status}")]
    RangeFetchFailed { status: u16, window: FetchWindow },

    #[error("decode failed after {attempts} attempt(s), last window {window_len} bytes: {reason}")]
    DecodeFailed {
        attempts: u32,
        window_len: u64,
        reason: String,
    },

    #[error("failed to remove temporary file {}: {reason}", path.display())]
    CleanupFailed { path: PathBuf, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decoder unavailable: {0}")]
    DecoderUnavailable(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// HTTP status carried by a failed range fetch.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RangeFetchFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short machine-readable tag, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SizeUnknown { .. } => "size_unknown",
            Self::RangeFetchFailed { .. } => "range_fetch_failed",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::CleanupFailed { .. } => "cleanup_failed",
            Self::Transport(_) => "transport",
            Self::DecoderUnavailable(_) => "decoder_unavailable",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Io(_) => "io",
        }
    }
}

/// Failure reported by a [`FrameDecoder`](crate::FrameDecoder) run.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("decoder produced no output")]
    EmptyOutput,

    #[error("decoder timed out after {0:?}")]
    TimedOut(Duration),

    #[error("decoder could not be started: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Whether more input bytes might let the decoder succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Failed { .. } | Self::EmptyOutput | Self::TimedOut(_)
        )
    }
}

/// Result of one outer extraction call: a payload or a specific reason.
pub type AttemptResult = Result<crate::types::Payload, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_failure_exposes_status() {
        let err = ExtractError::RangeFetchFailed {
            status: 403,
            window: FetchWindow::new(0, 10),
        };
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.kind(), "range_fetch_failed");
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn only_decoder_output_problems_are_retryable() {
        assert!(DecodeError::EmptyOutput.is_retryable());
        assert!(DecodeError::TimedOut(Duration::from_secs(1)).is_retryable());
        assert!(!DecodeError::Unavailable("ffmpeg".into()).is_retryable());
    }
}
