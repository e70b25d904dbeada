use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::path::Path;
use std::pin::Pin;
use url::Url;

use crate::error::{DecodeError, ExtractError};
use crate::types::{FetchWindow, ImageFormat};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ExtractError>> + Send>>;

/// Body of a successful range request.
pub struct RangeResponse {
    pub status: u16,
    /// Offset in the remote object of the first body byte. `0` when the
    /// server ignored `Range` and sent the whole object.
    pub body_offset: u64,
    pub body: ByteStream,
}

/// HTTP-like origin serving a single remote object.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Metadata-only request returning the object's total length.
    async fn probe_size(&self, url: &Url) -> Result<u64, ExtractError>;

    /// Single range request for `window`.
    async fn fetch_range(&self, url: &Url, window: FetchWindow) -> Result<RangeResponse, ExtractError>;
}

/// External decoder turning a (sparse) video file into one still image.
#[async_trait]
pub trait FrameDecoder: Send + Sync {
    fn format(&self) -> ImageFormat;

    /// Decode the first frame of `input` into `output`.
    async fn decode(&self, input: &Path, output: &Path) -> Result<(), DecodeError>;
}
