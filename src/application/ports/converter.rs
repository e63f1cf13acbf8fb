//! Audio conversion port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::input::InputAudioFile;

/// Conversion errors
#[derive(Debug, Clone, Error)]
pub enum ConversionError {
    #[error("Failed to start converter: {0}")]
    StartFailed(String),

    #[error("Converter exited with error: {0}")]
    Failed(String),

    #[error("Converter reported success but produced no file at {0}")]
    MissingOutput(PathBuf),
}

/// Port for transcoding the input into the intermediate WAV format
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Convert `input` into a 16 kHz mono WAV written to `output`.
    ///
    /// `output` must not exist yet; its parent directory must.
    async fn convert(&self, input: &InputAudioFile, output: &Path) -> Result<(), ConversionError>;
}
