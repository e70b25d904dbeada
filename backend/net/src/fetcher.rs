//! Range Fetcher: fills a sparse copy with the tail and head windows.

use framegrab_core::{ExtractError, RemoteAsset, RemoteSource, WindowPair};
use std::path::Path;
use tracing::{debug, info};

use crate::sparse::SparseFile;

/// What one fetch pass put on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    pub windows: WindowPair,
    pub bytes_written: u64,
}

/// Fetch the tail window, then the head window, of `asset` into `sparse_path`.
///
/// The tail goes first; callers and servers observe that order.
pub async fn fetch_window_pair<S>(
    source: &S,
    asset: &RemoteAsset,
    window_len: u64,
    sparse_path: &Path,
) -> Result<FetchReport, ExtractError>
where
    S: RemoteSource + ?Sized,
{
    let windows = asset.windows(window_len);
    let mut sparse = SparseFile::create(sparse_path, asset.total_size).await?;
    let mut bytes_written = 0;

    for (label, window) in [("tail", windows.tail), ("head", windows.head)] {
        if window.is_empty() {
            continue;
        }
        debug!(window = %window, "Requesting {label} window");
        let response = source.fetch_range(&asset.url, window).await?;
        let written = sparse.write_window(window, response).await?;
        info!(window = %window, bytes = written, "Fetched {label} window");
        bytes_written += written;
    }

    sparse.finish().await?;
    Ok(FetchReport {
        windows,
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RangeServer, ServerOptions};
    use crate::{HttpOptions, HttpSource};

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 253) as u8 + 1).collect()
    }

    #[tokio::test]
    async fn fetches_tail_before_head() {
        let body = sample(1000);
        let server = RangeServer::start(ServerOptions::new(body.clone())).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let asset = RemoteAsset::new(server.url(), 1000);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.mp4");

        let report = fetch_window_pair(&source, &asset, 100, &path).await.unwrap();
        assert_eq!(report.bytes_written, 200);
        assert_eq!(
            server.ranges(),
            vec!["bytes=900-999".to_string(), "bytes=0-99".to_string()]
        );

        let local = tokio::fs::read(&path).await.unwrap();
        assert_eq!(local.len(), 1000);
        assert_eq!(local[..100], body[..100]);
        assert_eq!(local[900..], body[900..]);
        assert!(local[100..900].iter().all(|b| *b == 0));
    }

    #[tokio::test]
    async fn oversized_window_copies_whole_file() {
        let body = sample(300);
        let server = RangeServer::start(ServerOptions::new(body.clone())).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let asset = RemoteAsset::new(server.url(), 300);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.mp4");

        let report = fetch_window_pair(&source, &asset, 4096, &path).await.unwrap();
        assert!(report.windows.covers(300));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), body);
    }

    #[tokio::test]
    async fn bad_status_stops_before_head() {
        let server = RangeServer::start(ServerOptions::new(sample(100)).with_range_status(403)).await;
        let source = HttpSource::new(HttpOptions::default()).unwrap();
        let asset = RemoteAsset::new(server.url(), 100);
        let dir = tempfile::tempdir().unwrap();

        let err = fetch_window_pair(&source, &asset, 10, &dir.path().join("s.mp4"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(server.get_count(), 1);
    }
}
