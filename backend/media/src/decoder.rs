//! Frame Decoder backed by the `ffmpeg` command line tool.

use async_trait::async_trait;
use framegrab_core::{DecodeError, DecodedFrame, FrameDecoder, ImageFormat};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::sniff_image_format;

#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: PathBuf,
    format: ImageFormat,
    timeout: Duration,
}

impl FfmpegDecoder {
    pub fn new(format: ImageFormat) -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            format,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments for a one-frame, errors-only, overwrite-output run.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        for arg in ["-frames:v", "1", "-f", "image2", "-c:v", self.format.ffmpeg_codec()] {
            args.push(arg.into());
        }
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl FrameDecoder for FfmpegDecoder {
    fn format(&self) -> ImageFormat {
        self.format
    }

    async fn decode(&self, input: &Path, output: &Path) -> Result<(), DecodeError> {
        debug!(program = %self.program.display(), input = %input.display(), "Running decoder");

        let run = tokio::process::Command::new(&self.program)
            .args(self.args(input, output))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok(out)) if out.status.success() => Ok(()),
            Ok(Ok(out)) => Err(DecodeError::Failed {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
            Ok(Err(e)) => Err(DecodeError::Unavailable(format!(
                "{}: {e}",
                self.program.display()
            ))),
            Err(_) => Err(DecodeError::TimedOut(self.timeout)),
        }
    }
}

/// Run `decoder` and collect its output as a frame.
///
/// The output must exist and be non-empty after `settle` has elapsed.
pub async fn decode_first_frame<D>(
    decoder: &D,
    input: &Path,
    output: &Path,
    settle: Duration,
) -> Result<DecodedFrame, DecodeError>
where
    D: FrameDecoder + ?Sized,
{
    decoder.decode(input, output).await?;

    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    match fs::metadata(output).await {
        Ok(meta) if meta.len() > 0 => {}
        Ok(_) => return Err(DecodeError::EmptyOutput),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DecodeError::EmptyOutput)
        }
        Err(e) => return Err(DecodeError::Io(e)),
    }

    let data = fs::read(output).await?;
    let format = decoder.format();
    if let Some(sniffed) = sniff_image_format(&data) {
        if sniffed != format {
            warn!(expected = %format, actual = %sniffed, "Decoder output format differs");
        }
    }
    Ok(DecodedFrame::new(format, data))
}
