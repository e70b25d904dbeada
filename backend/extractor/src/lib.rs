//! `framegrab-extractor`: first frame of a remote video from a partial download.
//!
//! Probes the size once, fetches the tail and head windows into a sparse
//! temporary copy, runs the decoder, and doubles the windows on decode
//! failure up to a ceiling. All temporary files are gone by the time a
//! result is returned.

pub mod artifacts;
pub mod controller;
pub mod options;
pub mod scratch;

pub use artifacts::{persist_artifacts, ArtifactTargets};
pub use controller::Extractor;
pub use options::ExtractOptions;
pub use scratch::ScratchFiles;
