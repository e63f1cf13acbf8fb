//! Transcription port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::service::ServiceEndpoint;

/// Transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Failed to read audio file: {0}")]
    ReadFailed(String),

    #[error("Upload request failed: {0}")]
    RequestFailed(String),

    #[error("ASR service error: {0}")]
    ApiError(String),

    #[error("Failed to write transcript: {0}")]
    WriteFailed(String),
}

impl TranscriptionError {
    /// Transport failures may succeed on another attempt; the rest will not
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }
}

/// Port for the speech-to-text backend
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Upload `audio` to the backend at `endpoint` and stream the plain-text
    /// transcript into `output`.
    ///
    /// # Returns
    /// Number of bytes written to `output`
    async fn transcribe_to_file(
        &self,
        endpoint: &ServiceEndpoint,
        audio: &Path,
        output: &Path,
    ) -> Result<u64, TranscriptionError>;
}
