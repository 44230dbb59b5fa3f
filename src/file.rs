//! Normalizing templates on disk.

use crate::error::TransformError;
use crate::transform::Normalizer;
use std::fs;
use std::path::Path;
use tracing::info;

/// Whether normalizing a file changed its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Changed,
    Unchanged,
}

impl Normalizer {
    /// Normalizes `path` and writes the result back if it differs from the input.
    pub fn transform_file(&self, path: impl AsRef<Path>) -> Result<FileOutcome, TransformError> {
        let path = path.as_ref();
        let (original, normalized) = self.read_and_transform(path)?;
        if original == normalized {
            info!(path = %path.display(), "No changes");
            return Ok(FileOutcome::Unchanged);
        }
        fs::write(path, normalized).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Template rewritten");
        Ok(FileOutcome::Changed)
    }

    /// Reports whether [`Normalizer::transform_file`] would change `path`, without writing.
    pub fn check_file(&self, path: impl AsRef<Path>) -> Result<FileOutcome, TransformError> {
        self.preview_file(path).map(|(outcome, _)| outcome)
    }

    /// The normalized text of `path` and whether it differs, leaving the file alone.
    pub fn preview_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(FileOutcome, String), TransformError> {
        let (original, normalized) = self.read_and_transform(path.as_ref())?;
        let outcome = if original == normalized {
            FileOutcome::Unchanged
        } else {
            FileOutcome::Changed
        };
        Ok((outcome, normalized))
    }

    fn read_and_transform(&self, path: &Path) -> Result<(String, String), TransformError> {
        let original = fs::read_to_string(path).map_err(|source| TransformError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let normalized = self.transform(&original)?;
        Ok((original, normalized))
    }
}

/// Normalizes `path` in place with the default normalizer.
pub fn transform_file(path: impl AsRef<Path>) -> Result<FileOutcome, TransformError> {
    Normalizer::default().transform_file(path)
}
