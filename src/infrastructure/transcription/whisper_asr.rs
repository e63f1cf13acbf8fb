//! Whisper ASR web service transcriber adapter

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::application::ports::{Transcriber, TranscriptionError};
use crate::domain::config::DEFAULT_LANGUAGE;
use crate::domain::service::ServiceEndpoint;

/// Multipart field carrying the audio
const AUDIO_FIELD: &str = "audio_file";

/// MIME type of the converted audio
const AUDIO_MIME: &str = "audio/wav";

/// Client for the `/asr` endpoint of the Whisper ASR web service
pub struct WhisperAsrTranscriber {
    language: String,
    client: reqwest::Client,
}

impl WhisperAsrTranscriber {
    /// Create a transcriber requesting English plain-text output
    pub fn new() -> Self {
        Self::with_language(DEFAULT_LANGUAGE)
    }

    /// Create a transcriber for another spoken language
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Fixed request parameters
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("task", "transcribe".to_string()),
            ("language", self.language.clone()),
            ("output", "txt".to_string()),
            ("word_timestamps", "false".to_string()),
        ]
    }

    /// Build the request URL. The service reads its options from the query
    /// string, so they are sent there as well as in the form.
    fn request_url(&self, endpoint: &ServiceEndpoint) -> Result<Url, TranscriptionError> {
        Url::parse_with_params(&endpoint.asr_url(), self.params())
            .map_err(|e| TranscriptionError::RequestFailed(format!("invalid URL: {}", e)))
    }

    /// Build the multipart body
    async fn build_form(&self, audio: &Path) -> Result<Form, TranscriptionError> {
        let bytes = fs::read(audio)
            .await
            .map_err(|e| TranscriptionError::ReadFailed(format!("{}: {}", audio.display(), e)))?;

        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(AUDIO_MIME)
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let form = self
            .params()
            .into_iter()
            .fold(Form::new().part(AUDIO_FIELD, part), |form, (k, v)| {
                form.text(k, v)
            });

        Ok(form)
    }
}

impl Default for WhisperAsrTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transcriber for WhisperAsrTranscriber {
    async fn transcribe_to_file(
        &self,
        endpoint: &ServiceEndpoint,
        audio: &Path,
        output: &Path,
    ) -> Result<u64, TranscriptionError> {
        let url = self.request_url(endpoint)?;
        let form = self.build_form(audio).await?;
        debug!(%url, "uploading audio");

        let mut response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TranscriptionError::ApiError(format!(
                "HTTP {}: {}",
                status,
                error_text.trim()
            )));
        }

        let partial = partial_path(output);
        let written = match stream_to_file(&mut response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial, output).await {
            let _ = fs::remove_file(&partial).await;
            return Err(TranscriptionError::WriteFailed(format!(
                "{}: {}",
                output.display(),
                e
            )));
        }

        if written == 0 {
            warn!(path = %output.display(), "service returned an empty transcript");
        }

        Ok(written)
    }
}

/// Sibling path the body is streamed into before the final rename
fn partial_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output.with_file_name(name)
}

/// Copy the response body into `path`, failing on a short or broken body
async fn stream_to_file(
    response: &mut reqwest::Response,
    path: &Path,
) -> Result<u64, TranscriptionError> {
    let mut file = File::create(path)
        .await
        .map_err(|e| TranscriptionError::WriteFailed(format!("{}: {}", path.display(), e)))?;

    let mut written: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| TranscriptionError::WriteFailed(e.to_string()))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| TranscriptionError::WriteFailed(e.to_string()))?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_carries_fixed_options() {
        let transcriber = WhisperAsrTranscriber::new();
        let url = transcriber
            .request_url(&ServiceEndpoint::new("localhost", 9000))
            .unwrap();

        assert_eq!(url.path(), "/asr");
        assert_eq!(url.port(), Some(9000));
        let query = url.query().unwrap();
        assert!(query.contains("task=transcribe"));
        assert!(query.contains("language=en"));
        assert!(query.contains("output=txt"));
        assert!(query.contains("word_timestamps=false"));
    }

    #[test]
    fn custom_language() {
        let transcriber = WhisperAsrTranscriber::with_language("de");
        let url = transcriber
            .request_url(&ServiceEndpoint::new("localhost", 9000))
            .unwrap();
        assert!(url.query().unwrap().contains("language=de"));
    }

    #[test]
    fn partial_path_sits_beside_output() {
        let path = partial_path(Path::new("/out/meeting-093000.txt"));
        assert_eq!(path, PathBuf::from("/out/meeting-093000.txt.part"));
    }

    #[tokio::test]
    async fn missing_audio_file_is_read_error() {
        let transcriber = WhisperAsrTranscriber::new();
        let err = transcriber
            .build_form(Path::new("/nonexistent/audio.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::ReadFailed(_)));
    }
}
