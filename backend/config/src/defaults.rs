//! Config defaults: applies default values to parsed config.

use framegrab_core::{ImageFormat, MIB};

use crate::schema::{ExtractConfig, FramegrabConfig, LoggingConfig};

/// Default first window length (bytes).
pub const DEFAULT_INITIAL_WINDOW: u64 = MIB;

/// Default ceiling as a multiple of the initial window.
pub const DEFAULT_MAX_WINDOW_FACTOR: u64 = 8;

/// Default per-request HTTP timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default decoder timeout.
pub const DEFAULT_DECODE_TIMEOUT_SECS: u64 = 30;

/// Default wait before checking decoder output.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: FramegrabConfig) -> FramegrabConfig {
    let config = apply_extract_defaults(config);
    apply_logging_defaults(config)
}

/// Window sizing, timeouts and decoder settings.
fn apply_extract_defaults(mut config: FramegrabConfig) -> FramegrabConfig {
    let extract = config.extract.get_or_insert_with(ExtractConfig::default);

    let initial = *extract.initial_window.get_or_insert(DEFAULT_INITIAL_WINDOW);
    if extract.max_window.is_none() {
        extract.max_window = Some(initial.saturating_mul(DEFAULT_MAX_WINDOW_FACTOR));
    }
    extract.timeout_secs.get_or_insert(DEFAULT_TIMEOUT_SECS);
    extract.decode_timeout_secs.get_or_insert(DEFAULT_DECODE_TIMEOUT_SECS);
    extract.settle_delay_ms.get_or_insert(DEFAULT_SETTLE_DELAY_MS);
    extract.format.get_or_insert(ImageFormat::Jpeg);
    if extract.ffmpeg_path.is_none() {
        extract.ffmpeg_path = Some(DEFAULT_FFMPEG_PATH.to_string());
    }
    config
}

fn apply_logging_defaults(mut config: FramegrabConfig) -> FramegrabConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    logging.json.get_or_insert(false);
    config
}
