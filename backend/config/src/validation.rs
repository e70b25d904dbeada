//! Config validation with user-friendly messages.

use crate::schema::FramegrabConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &FramegrabConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_windows(config, &mut report);
    validate_extract(config, &mut report);
    validate_logging(config, &mut report);
    report
}

/// Window sizing: a positive start and a ceiling reachable by doubling.
fn validate_windows(config: &FramegrabConfig, report: &mut ValidationReport) {
    let Some(extract) = &config.extract else { return };

    if extract.initial_window == Some(0) {
        report.error("extract.initialWindow", "initialWindow must be > 0");
        return;
    }

    if let (Some(initial), Some(max)) = (extract.initial_window, extract.max_window) {
        if max < initial {
            report.error(
                "extract.maxWindow",
                format!("maxWindow ({max}) must be >= initialWindow ({initial})"),
            );
        } else if max % initial != 0 || !(max / initial).is_power_of_two() {
            report.warn(
                "extract.maxWindow",
                format!(
                    "maxWindow ({max}) is not initialWindow ({initial}) times a power of two; \
                     the largest window tried will be below it"
                ),
            );
        }
    }
}

fn validate_extract(config: &FramegrabConfig, report: &mut ValidationReport) {
    let Some(extract) = &config.extract else { return };

    if extract.timeout_secs == Some(0) {
        report.error("extract.timeoutSecs", "timeoutSecs must be >= 1");
    }
    if extract.decode_timeout_secs == Some(0) {
        report.error("extract.decodeTimeoutSecs", "decodeTimeoutSecs must be >= 1");
    }
    if let Some(path) = &extract.ffmpeg_path {
        if path.trim().is_empty() {
            report.error("extract.ffmpegPath", "ffmpegPath cannot be empty");
        }
    }
    if let Some(ms) = extract.settle_delay_ms {
        if ms > 5_000 {
            report.warn(
                "extract.settleDelayMs",
                format!("settleDelayMs of {ms} adds a long pause to every attempt"),
            );
        }
    }
}

fn validate_logging(config: &FramegrabConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !matches!(
            level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) && !level.contains('=')
        {
            report.warn(
                "logging.level",
                format!("Unknown log level '{level}'; expected trace|debug|info|warn|error|off or a filter directive"),
            );
        }
    }
}
