use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// One mebibyte, the unit window sizes are expressed in.
pub const MIB: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// A contiguous byte range `[offset, offset + length)` of a remote object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub offset: u64,
    pub length: u64,
}

impl FetchWindow {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Head window `[0, min(length, total_size))`.
    pub fn head(total_size: u64, length: u64) -> Self {
        Self::new(0, length.min(total_size))
    }

    /// Tail window `[max(0, total_size - length), total_size)`.
    pub fn tail(total_size: u64, length: u64) -> Self {
        let start = total_size.saturating_sub(length);
        Self::new(start, total_size - start)
    }

    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Value for the HTTP `Range` header. The end bound is inclusive on the wire.
    pub fn range_header(&self) -> String {
        format!("bytes={}-{}", self.offset, self.end().saturating_sub(1))
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}

/// The tail and head windows fetched together in one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPair {
    pub tail: FetchWindow,
    pub head: FetchWindow,
}

impl WindowPair {
    pub fn new(total_size: u64, length: u64) -> Self {
        Self {
            tail: FetchWindow::tail(total_size, length),
            head: FetchWindow::head(total_size, length),
        }
    }

    /// Whether every byte of `[0, total_size)` falls inside one of the windows.
    pub fn covers(&self, total_size: u64) -> bool {
        let (first, second) = if self.head.offset <= self.tail.offset {
            (self.head, self.tail)
        } else {
            (self.tail, self.head)
        };
        first.offset == 0 && second.offset <= first.end() && second.end().max(first.end()) >= total_size
    }
}

// ---------------------------------------------------------------------------
// Remote asset
// ---------------------------------------------------------------------------

/// A remote video whose total length has been probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAsset {
    pub url: Url,
    pub total_size: u64,
}

impl RemoteAsset {
    pub fn new(url: Url, total_size: u64) -> Self {
        Self { url, total_size }
    }

    pub fn windows(&self, length: u64) -> WindowPair {
        WindowPair::new(self.total_size, length)
    }
}

// ---------------------------------------------------------------------------
// Image format
// ---------------------------------------------------------------------------

/// Still-image codec the decoder is asked to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Encoder name understood by ffmpeg's `-c:v`.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Jpeg => "mjpeg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jpeg => f.write_str("jpeg"),
            Self::Png => f.write_str("png"),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(format!("unsupported image format '{other}' (use jpeg or png)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame and payload
// ---------------------------------------------------------------------------

/// Raw bytes of one decoded still image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub format: ImageFormat,
    pub data: Bytes,
}

impl DecodedFrame {
    pub fn new(format: ImageFormat, data: impl Into<Bytes>) -> Self {
        Self {
            format,
            data: data.into(),
        }
    }
}

/// A MIME-tagged, base64 data URI representing a decoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub format: ImageFormat,
    pub data_uri: String,
}

impl Payload {
    pub fn as_str(&self) -> &str {
        &self.data_uri
    }

    pub fn into_string(self) -> String {
        self.data_uri
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_cover_file_once_length_reaches_size() {
        for total in [1u64, 7, 4096, 10 * MIB, 10 * MIB + 3] {
            for length in [total, total + 1, total * 2, 8 * MIB.max(total)] {
                let pair = WindowPair::new(total, length);
                assert!(pair.covers(total), "total={total} length={length}");
                assert!(pair.head.end() <= total);
                assert_eq!(pair.tail.end(), total);
            }
        }
    }

    #[test]
    fn small_windows_leave_a_gap() {
        let pair = WindowPair::new(10 * MIB, MIB);
        assert_eq!(pair.head, FetchWindow::new(0, MIB));
        assert_eq!(pair.tail, FetchWindow::new(9 * MIB, MIB));
        assert!(!pair.covers(10 * MIB));
    }

    #[test]
    fn overlapping_windows_cover() {
        let pair = WindowPair::new(3 * MIB, 2 * MIB);
        assert_eq!(pair.tail.offset, MIB);
        assert!(pair.covers(3 * MIB));
    }

    #[test]
    fn range_header_is_inclusive() {
        assert_eq!(FetchWindow::new(0, MIB).range_header(), "bytes=0-1048575");
        assert_eq!(FetchWindow::tail(100, 10).range_header(), "bytes=90-99");
    }

    #[test]
    fn image_format_parses_and_serializes() {
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert!("gif".parse::<ImageFormat>().is_err());
        assert_eq!(serde_json::to_string(&ImageFormat::Png).unwrap(), "\"png\"");
        assert_eq!(ImageFormat::default().mime(), "image/jpeg");
    }
}
