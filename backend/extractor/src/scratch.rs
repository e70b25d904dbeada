//! Resource Lifecycle Manager: the two temporary files one attempt owns.
//!
//! Both paths are created up front with their handles already closed. They
//! are removed by [`ScratchFiles::release`], or by `Drop` if an attempt
//! unwinds before reaching it.

use framegrab_core::{ExtractError, ImageFormat};
use std::io;
use std::path::Path;
use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

const PREFIX: &str = "framegrab-";

pub struct ScratchFiles {
    sparse: TempPath,
    frame: TempPath,
}

impl ScratchFiles {
    /// Create the sparse-copy and frame files in `dir` (system temp dir if `None`).
    pub fn acquire(dir: Option<&Path>, format: ImageFormat) -> Result<Self, ExtractError> {
        let sparse = create(dir, ".mp4")?;
        let frame = create(dir, &format!(".{}", format.extension()))?;
        debug!(sparse = %sparse.display(), frame = %frame.display(), "Acquired scratch files");
        Ok(Self { sparse, frame })
    }

    pub fn sparse_path(&self) -> &Path {
        &self.sparse
    }

    pub fn frame_path(&self) -> &Path {
        &self.frame
    }

    /// Delete both files. Failures are logged and returned, never raised.
    pub fn release(self) -> Vec<ExtractError> {
        let mut failures = Vec::new();
        for temp in [self.sparse, self.frame] {
            let path = temp.to_path_buf();
            match temp.close() {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    let err = ExtractError::CleanupFailed {
                        path,
                        reason: e.to_string(),
                    };
                    warn!(error = %err, "Scratch cleanup failed");
                    failures.push(err);
                }
            }
        }
        failures
    }
}

fn create(dir: Option<&Path>, suffix: &str) -> Result<TempPath, ExtractError> {
    let mut builder = Builder::new();
    builder.prefix(PREFIX).suffix(suffix);
    let file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn release_removes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFiles::acquire(Some(dir.path()), ImageFormat::Jpeg).unwrap();
        assert_eq!(entries(dir.path()), 2);
        assert!(scratch.sparse_path().to_string_lossy().ends_with(".mp4"));
        assert!(scratch.frame_path().to_string_lossy().ends_with(".jpg"));

        assert!(scratch.release().is_empty());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn already_removed_file_is_not_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchFiles::acquire(Some(dir.path()), ImageFormat::Png).unwrap();
        std::fs::remove_file(scratch.frame_path()).unwrap();
        assert!(scratch.release().is_empty());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn drop_also_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _scratch = ScratchFiles::acquire(Some(dir.path()), ImageFormat::Jpeg).unwrap();
            assert_eq!(entries(dir.path()), 2);
        }
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn missing_dir_fails_to_acquire() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let err = ScratchFiles::acquire(Some(&gone), ImageFormat::Jpeg).err().unwrap();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}
