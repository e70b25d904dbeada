use framegrab_config::defaults::{
    DEFAULT_DECODE_TIMEOUT_SECS, DEFAULT_FFMPEG_PATH, DEFAULT_INITIAL_WINDOW,
    DEFAULT_MAX_WINDOW_FACTOR, DEFAULT_SETTLE_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use framegrab_config::ExtractConfig;
use framegrab_core::ImageFormat;
use framegrab_net::{HttpOptions, DEFAULT_USER_AGENT};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs for one [`Extractor`](crate::Extractor).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub initial_window: u64,
    pub max_window: u64,
    pub request_timeout: Duration,
    pub decode_timeout: Duration,
    pub settle_delay: Duration,
    pub format: ImageFormat,
    pub ffmpeg_path: PathBuf,
    /// System temp dir when `None`.
    pub scratch_dir: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            initial_window: DEFAULT_INITIAL_WINDOW,
            max_window: DEFAULT_INITIAL_WINDOW * DEFAULT_MAX_WINDOW_FACTOR,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            decode_timeout: Duration::from_secs(DEFAULT_DECODE_TIMEOUT_SECS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            format: ImageFormat::Jpeg,
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_PATH),
            scratch_dir: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ExtractOptions {
    /// Build from a (possibly partial) `extract` config section.
    pub fn from_config(cfg: &ExtractConfig) -> Self {
        let base = Self::default();
        let initial_window = cfg.initial_window.unwrap_or(base.initial_window);
        Self {
            initial_window,
            max_window: cfg
                .max_window
                .unwrap_or_else(|| initial_window.saturating_mul(DEFAULT_MAX_WINDOW_FACTOR)),
            request_timeout: cfg
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(base.request_timeout),
            decode_timeout: cfg
                .decode_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(base.decode_timeout),
            settle_delay: cfg
                .settle_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(base.settle_delay),
            format: cfg.format.unwrap_or(base.format),
            ffmpeg_path: cfg
                .ffmpeg_path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or(base.ffmpeg_path),
            scratch_dir: cfg.scratch_dir.clone(),
            user_agent: cfg.user_agent.clone().unwrap_or(base.user_agent),
        }
    }

    /// Set the first window and the ceiling together.
    pub fn with_windows(mut self, initial_window: u64, max_window: u64) -> Self {
        self.initial_window = initial_window;
        self.max_window = max_window;
        self
    }

    /// Window to try after a decode failure at `current`, if within the ceiling.
    pub fn next_window(&self, current: u64) -> Option<u64> {
        current.checked_mul(2).filter(|next| *next <= self.max_window)
    }

    /// Window lengths tried in order, starting from the initial window. Never empty.
    pub fn window_schedule(&self) -> Vec<u64> {
        let mut lengths = vec![self.initial_window.max(1)];
        while let Some(next) = lengths.last().and_then(|l| self.next_window(*l)) {
            lengths.push(next);
        }
        lengths
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            request_timeout: self.request_timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}
