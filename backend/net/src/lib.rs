//! `framegrab-net`: probing and partial download of remote videos.

pub mod client;
pub mod fetcher;
pub mod sparse;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{HttpOptions, HttpSource, DEFAULT_USER_AGENT};
pub use fetcher::{fetch_window_pair, FetchReport};
pub use sparse::SparseFile;
