//! Retry Controller.
//!
//! Probe once, then run fetch + decode attempts, doubling the window after
//! each decode failure, until a frame decodes or the next window would exceed
//! the ceiling. Only decode failures advance to the next window; probe and
//! fetch failures end the call.

use framegrab_core::{
    AttemptResult, DecodeError, ExtractError, FrameDecoder, Payload, RemoteAsset, RemoteSource,
};
use framegrab_logging::{redact_url, EventLogger, ExtractEvent};
use framegrab_media::{decode_first_frame, encode_payload, FfmpegDecoder};
use framegrab_net::{fetch_window_pair, HttpSource};
use tracing::{info, warn};
use url::Url;

use crate::options::ExtractOptions;
use crate::scratch::ScratchFiles;

/// How one attempt ended when it did not yield a payload.
enum AttemptFailure {
    /// Decoder could not produce a frame from the bytes fetched so far.
    Decode(DecodeError),
    /// Anything else; ends the whole call.
    Fatal(ExtractError),
}

pub struct Extractor<S, D> {
    source: S,
    decoder: D,
    options: ExtractOptions,
}

impl Extractor<HttpSource, FfmpegDecoder> {
    /// HTTP source and `ffmpeg` decoder configured from `options`.
    pub fn from_options(options: ExtractOptions) -> Result<Self, ExtractError> {
        let source = HttpSource::new(options.http_options())?;
        let decoder = FfmpegDecoder::new(options.format)
            .with_program(options.ffmpeg_path.clone())
            .with_timeout(options.decode_timeout);
        Ok(Self::new(source, decoder, options))
    }
}

impl<S, D> Extractor<S, D>
where
    S: RemoteSource,
    D: FrameDecoder,
{
    pub fn new(source: S, decoder: D, options: ExtractOptions) -> Self {
        Self {
            source,
            decoder,
            options,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the first frame of the video at `url` as a data-URI payload.
    pub async fn extract(&self, url: &str) -> AttemptResult {
        let url = parse_url(url)?;
        let shown = redact_url(&url);
        info!(url = %shown, "Extracting first frame");

        let result = self.run(&url, &shown).await;
        match &result {
            Ok(payload) => info!(url = %shown, bytes = payload.data_uri.len(), "Frame extracted"),
            Err(err) => {
                warn!(url = %shown, error = %err, "Frame extraction failed");
                EventLogger::log_event(
                    &shown,
                    ExtractEvent::Failed {
                        kind: err.kind().to_string(),
                        message: err.to_string(),
                    },
                );
            }
        }
        result
    }

    async fn run(&self, url: &Url, shown: &str) -> AttemptResult {
        let total_size = self.source.probe_size(url).await?;
        EventLogger::log_event(shown, ExtractEvent::Probed { total_size });

        let asset = RemoteAsset::new(url.clone(), total_size);
        let mut window_len = self.options.initial_window.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let err = match self.attempt(&asset, shown, window_len, attempt).await {
                Ok(payload) => {
                    EventLogger::log_event(
                        shown,
                        ExtractEvent::Completed {
                            attempts: attempt,
                            payload_len: payload.data_uri.len(),
                        },
                    );
                    return Ok(payload);
                }
                Err(AttemptFailure::Fatal(err)) => return Err(err),
                Err(AttemptFailure::Decode(err)) => err,
            };

            EventLogger::log_event(
                shown,
                ExtractEvent::DecodeFailed {
                    attempt,
                    window_len,
                    reason: err.to_string(),
                },
            );

            let Some(next) = self.options.next_window(window_len) else {
                return Err(ExtractError::DecodeFailed {
                    attempts: attempt,
                    window_len,
                    reason: err.to_string(),
                });
            };
            EventLogger::log_event(
                shown,
                ExtractEvent::WindowGrown {
                    from: window_len,
                    to: next,
                },
            );
            window_len = next;
        }
    }

    /// One fetch + decode pass. Scratch files are released before returning.
    async fn attempt(
        &self,
        asset: &RemoteAsset,
        shown: &str,
        window_len: u64,
        attempt: u32,
    ) -> Result<Payload, AttemptFailure> {
        let scratch = ScratchFiles::acquire(self.options.scratch_dir.as_deref(), self.decoder.format())
            .map_err(AttemptFailure::Fatal)?;

        let outcome = self.fetch_and_decode(&scratch, asset, shown, window_len, attempt).await;

        // Cleanup problems are logged inside `release` and never replace `outcome`.
        let _ = scratch.release();
        outcome
    }

    async fn fetch_and_decode(
        &self,
        scratch: &ScratchFiles,
        asset: &RemoteAsset,
        shown: &str,
        window_len: u64,
        attempt: u32,
    ) -> Result<Payload, AttemptFailure> {
        info!(attempt, window_len, total_size = asset.total_size, "Fetching windows");
        let report = fetch_window_pair(&self.source, asset, window_len, scratch.sparse_path())
            .await
            .map_err(AttemptFailure::Fatal)?;
        EventLogger::log_event(
            shown,
            ExtractEvent::WindowFetched {
                attempt,
                window_len,
                bytes_written: report.bytes_written,
            },
        );

        let frame = decode_first_frame(
            &self.decoder,
            scratch.sparse_path(),
            scratch.frame_path(),
            self.options.settle_delay,
        )
        .await
        .map_err(classify_decode_error)?;

        Ok(encode_payload(&frame))
    }
}

fn classify_decode_error(err: DecodeError) -> AttemptFailure {
    if err.is_retryable() {
        return AttemptFailure::Decode(err);
    }
    AttemptFailure::Fatal(match err {
        DecodeError::Io(e) => ExtractError::Io(e),
        other => ExtractError::DecoderUnavailable(other.to_string()),
    })
}

fn parse_url(raw: &str) -> Result<Url, ExtractError> {
    let url = Url::parse(raw.trim()).map_err(|e| ExtractError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractError::InvalidUrl(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}
