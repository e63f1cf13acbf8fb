//! Input validation before any work starts

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use crate::domain::error::InputValidationError;
use crate::domain::input::InputAudioFile;

/// Look up `path` on disk and validate it as an input audio file.
///
/// Read-only: nothing is created or modified.
pub async fn validate_input(path: &Path) -> Result<InputAudioFile, InputValidationError> {
    let metadata = fs::metadata(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => InputValidationError::NotFound(path.to_path_buf()),
        _ => InputValidationError::NotAFile(path.to_path_buf()),
    })?;

    if !metadata.is_file() {
        return Err(InputValidationError::NotAFile(path.to_path_buf()));
    }

    InputAudioFile::validate(path, metadata.len())
}
