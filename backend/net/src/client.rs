//! HTTP implementation of [`RemoteSource`] on top of `reqwest`.

use async_trait::async_trait;
use framegrab_core::{ExtractError, FetchWindow, RangeResponse, RemoteSource};
use futures::TryStreamExt;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Browser-like agent; some CDNs refuse range requests from unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Clone, Debug)]
pub struct HttpOptions {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpSource {
    inner: Client,
}

impl HttpSource {
    /// Build a source with its own connection pool.
    pub fn new(options: HttpOptions) -> Result<Self, ExtractError> {
        let inner = Client::builder()
            .timeout(options.request_timeout)
            .user_agent(options.user_agent)
            .build()
            .map_err(transport)?;
        Ok(Self { inner })
    }
}

fn transport(err: reqwest::Error) -> ExtractError {
    ExtractError::Transport(err.to_string())
}

// Query strings often carry signed tokens; keep them out of error text.
fn size_unknown(url: &Url) -> ExtractError {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.set_fragment(None);
    ExtractError::SizeUnknown {
        url: shown.to_string(),
    }
}

/// Parse a positive `Content-Length`; zero, missing or garbage yield `None`.
pub fn parse_content_length(value: Option<&str>) -> Option<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|len| *len > 0)
}

/// First byte offset of a `Content-Range: bytes a-b/total` value.
pub fn parse_content_range_start(value: &str) -> Option<u64> {
    let range = value.trim().strip_prefix("bytes")?.trim_start();
    let (start, _) = range.split_once('-')?;
    start.trim().parse().ok()
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn probe_size(&self, url: &Url) -> Result<u64, ExtractError> {
        let resp = self.inner.head(url.clone()).send().await.map_err(transport)?;
        let status = resp.status();

        // Read the header directly: `Response::content_length` reflects the
        // (empty) HEAD body, not the advertised object size.
        let raw = resp
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok());

        if !status.is_success() {
            warn!(status = status.as_u16(), "Size probe returned non-success status");
            return Err(size_unknown(url));
        }

        match parse_content_length(raw) {
            Some(total) => {
                debug!(total_size = total, "Probed remote size");
                Ok(total)
            }
            None => Err(size_unknown(url)),
        }
    }

    async fn fetch_range(
        &self,
        url: &Url,
        window: FetchWindow,
    ) -> Result<RangeResponse, ExtractError> {
        let resp = self
            .inner
            .get(url.clone())
            .header(header::RANGE, window.range_header())
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        let body_offset = match status {
            StatusCode::PARTIAL_CONTENT => resp
                .headers()
                .get(header::CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range_start)
                .unwrap_or(window.offset),
            StatusCode::OK => {
                debug!(window = %window, "Server ignored Range; reading from offset 0");
                0
            }
            other => {
                return Err(ExtractError::RangeFetchFailed {
                    status: other.as_u16(),
                    window,
                })
            }
        };

        let body = resp.bytes_stream().map_err(transport);
        Ok(RangeResponse {
            status: status.as_u16(),
            body_offset,
            body: Box::pin(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RangeServer, ServerOptions};
    use futures::StreamExt;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn content_length_parsing() {
        assert_eq!(parse_content_length(Some("1024")), Some(1024));
        assert_eq!(parse_content_length(Some(" 42 ")), Some(42));
        assert_eq!(parse_content_length(Some("0")), None);
        assert_eq!(parse_content_length(Some("abc")), None);
        assert_eq!(parse_content_length(None), None);
    }

    #[test]
    fn content_range_parsing() {
        assert_eq!(parse_content_range_start("bytes 90-99/100"), Some(90));
        assert_eq!(parse_content_range_start("bytes 0-0/*"), Some(0));
        assert_eq!(parse_content_range_start("items 1-2"), None);
    }

    #[tokio::test]
    async fn probes_advertised_length() {
        let server = RangeServer::start(ServerOptions::new(sample(5000))).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let total = source.probe_size(&server.url()).await.unwrap();
        assert_eq!(total, 5000);
        assert_eq!(server.head_count(), 1);
    }

    #[tokio::test]
    async fn missing_length_is_size_unknown() {
        let server = RangeServer::start(ServerOptions::new(sample(100)).without_length()).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let err = source.probe_size(&server.url()).await.unwrap_err();
        assert!(matches!(err, ExtractError::SizeUnknown { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn fetches_requested_range() {
        let body = sample(1000);
        let server = RangeServer::start(ServerOptions::new(body.clone())).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();

        let window = FetchWindow::tail(1000, 100);
        let resp = source.fetch_range(&server.url(), window).await.unwrap();
        assert_eq!(resp.status, 206);
        assert_eq!(resp.body_offset, 900);

        let chunks: Vec<_> = resp.body.collect().await;
        let got: Vec<u8> = chunks
            .into_iter()
            .flat_map(|c| c.unwrap().to_vec())
            .collect();
        assert_eq!(got, body[900..]);
        assert_eq!(server.ranges(), vec!["bytes=900-999".to_string()]);
    }

    #[tokio::test]
    async fn forbidden_range_reports_status() {
        let server = RangeServer::start(ServerOptions::new(sample(10)).with_range_status(403)).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let err = source
            .fetch_range(&server.url(), FetchWindow::head(10, 5))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code(), Some(403));
    }

    #[tokio::test]
    async fn dropped_body_surfaces_as_transport_error() {
        let server = RangeServer::start(ServerOptions::new(sample(4096)).aborting_body()).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let resp = source
            .fetch_range(&server.url(), FetchWindow::head(4096, 4096))
            .await
            .unwrap();
        let chunks: Vec<_> = resp.body.collect().await;
        assert!(
            chunks
                .iter()
                .any(|c| matches!(c, Err(ExtractError::Transport(_)))),
            "stream ended without an error"
        );
    }

    #[tokio::test]
    async fn full_content_starts_at_zero() {
        let server = RangeServer::start(ServerOptions::new(sample(64)).ignoring_range()).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let resp = source
            .fetch_range(&server.url(), FetchWindow::tail(64, 8))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body_offset, 0);
    }
}
