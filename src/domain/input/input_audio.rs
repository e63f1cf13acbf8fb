//! Input audio file value object

use std::path::{Path, PathBuf};

use crate::domain::error::InputValidationError;

/// Files at or below this size are rejected (10 KiB)
pub const MIN_INPUT_BYTES: u64 = 10_240;

/// The only accepted input extension
pub const INPUT_EXTENSION: &str = "m4a";

/// A validated `.m4a` file larger than [`MIN_INPUT_BYTES`].
///
/// Construct through [`InputAudioFile::validate`], which checks size and
/// extension. Existence is checked by the caller, which owns the filesystem
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputAudioFile {
    path: PathBuf,
    size_bytes: u64,
}

impl InputAudioFile {
    /// Validate an existing file given its path and size in bytes
    pub fn validate(
        path: impl Into<PathBuf>,
        size_bytes: u64,
    ) -> Result<Self, InputValidationError> {
        let path = path.into();

        if size_bytes <= MIN_INPUT_BYTES {
            return Err(InputValidationError::TooSmall {
                path,
                size: size_bytes,
                min: MIN_INPUT_BYTES,
            });
        }

        if !has_input_extension(&path) {
            return Err(InputValidationError::WrongExtension(path));
        }

        Ok(Self { path, size_bytes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File name without extension, used as the base of every output name
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "audio".to_string())
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes;
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(INPUT_EXTENSION))
        .unwrap_or(false)
}
