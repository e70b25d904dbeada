//! Sparse local copy of a remote object.
//!
//! The file is pre-sized to the remote length and bytes are written at their
//! true offsets; anything never fetched reads back as zeros.

use framegrab_core::{ExtractError, FetchWindow, RangeResponse};
use futures::StreamExt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::trace;

pub struct SparseFile {
    file: File,
    path: PathBuf,
    total_size: u64,
}

impl SparseFile {
    /// Open `path` for writing and size it to `total_size`.
    pub async fn create(path: &Path, total_size: u64) -> Result<Self, ExtractError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        file.set_len(total_size).await?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            total_size,
        })
    }

    /// Stream a range response into the file at its true offsets.
    ///
    /// Reading stops once `window` is filled, so a server that answers with
    /// the whole object only costs the bytes up to the window's end.
    /// Returns the number of bytes written.
    pub async fn write_window(
        &mut self,
        window: FetchWindow,
        response: RangeResponse,
    ) -> Result<u64, ExtractError> {
        let limit = window.end().min(self.total_size);
        let mut pos = response.body_offset;
        let mut written = 0u64;
        let mut body = response.body;

        self.file.seek(SeekFrom::Start(pos)).await?;

        while pos < limit {
            let Some(chunk) = body.next().await else { break };
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            let take = ((limit - pos) as usize).min(chunk.len());
            self.file.write_all(&chunk[..take]).await?;
            pos += take as u64;
            written += take as u64;
            trace!(window = %window, written, "Wrote chunk");
        }

        Ok(written)
    }

    /// Flush and close the handle so the decoder sees every byte.
    pub async fn finish(mut self) -> Result<PathBuf, ExtractError> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(self.path)
    }
}
