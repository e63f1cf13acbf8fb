//! Transcribe file use case: validate, convert, serve, transcribe

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::domain::config::PipelineSettings;
use crate::domain::error::InputValidationError;
use crate::domain::input::InputAudioFile;
use crate::domain::output::{unique_path, ResultLayout};
use crate::domain::service::{ServiceEndpoint, ServiceState};

use super::port_allocator::allocate_port;
use super::ports::{
    AudioConverter, Clock, ContainerRuntime, ConversionError, HealthCheck, LaunchLock,
    PortProbe, RuntimeError, Transcriber, TranscriptionError,
};
use super::preflight::validate_input;
use super::service_lifecycle::{ReadinessPolicy, ServiceError, ServiceLifecycle};

/// Extension of the intermediate audio file
const CONVERTED_EXTENSION: &str = "wav";

/// Extension of the transcript file
const TRANSCRIPT_EXTENSION: &str = "txt";

/// Errors from the transcribe use case. Every variant ends the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Usage(String),

    #[error("Invalid input: {0}")]
    InputValidation(#[from] InputValidationError),

    #[error("Docker is not available: {0}")]
    Environment(RuntimeError),

    #[error("Failed to prepare output directory: {0}")]
    Output(String),

    #[error("Audio conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("{0}")]
    ServiceStart(#[from] ServiceError),

    #[error("Transcription failed: {0}")]
    Upload(#[from] TranscriptionError),
}

/// Output from the transcribe use case
#[derive(Debug, Clone)]
pub struct TranscribeOutput {
    pub input: InputAudioFile,
    /// Intermediate WAV in the working-files directory
    pub converted_path: PathBuf,
    /// Transcript in the transcribed-output directory
    pub transcript_path: PathBuf,
    pub transcript_bytes: u64,
    pub endpoint: ServiceEndpoint,
    pub service_state: ServiceState,
    /// Wall-clock time from start to finish
    pub elapsed: Duration,
}

/// Callbacks for stage progress
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct TranscribeCallbacks {
    /// Called once the input passed validation
    pub on_validated: Option<Box<dyn Fn(&InputAudioFile) + Send + Sync>>,
    /// Called when conversion starts
    pub on_converting_start: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called with the converted file path
    pub on_converting_end: Option<Box<dyn Fn(&Path) + Send + Sync>>,
    /// Called before looking for (or starting) the backend
    pub on_service_start: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called once the backend is reachable
    pub on_service_ready: Option<Box<dyn Fn(&ServiceEndpoint, ServiceState) + Send + Sync>>,
    /// Called when the upload starts
    pub on_transcribing_start: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called with the transcript path
    pub on_transcribing_end: Option<Box<dyn Fn(&Path) + Send + Sync>>,
}

/// One-shot file transcription use case
pub struct TranscribeFileUseCase<R, C, P, H, T, L, K>
where
    R: ContainerRuntime,
    C: AudioConverter,
    P: PortProbe,
    H: HealthCheck,
    T: Transcriber,
    L: LaunchLock,
    K: Clock,
{
    runtime: R,
    converter: C,
    probe: P,
    health: H,
    transcriber: T,
    launch_lock: L,
    clock: K,
    settings: PipelineSettings,
    stop_flag: Arc<AtomicBool>,
}

impl<R, C, P, H, T, L, K> TranscribeFileUseCase<R, C, P, H, T, L, K>
where
    R: ContainerRuntime,
    C: AudioConverter,
    P: PortProbe,
    H: HealthCheck,
    T: Transcriber,
    L: LaunchLock,
    K: Clock,
{
    /// Create a new use case instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        runtime: R,
        converter: C,
        probe: P,
        health: H,
        transcriber: T,
        launch_lock: L,
        clock: K,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            runtime,
            converter,
            probe,
            health,
            transcriber,
            launch_lock,
            clock,
            settings,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the stop flag for external signal handling
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    /// Execute the pipeline for `input_path`
    pub async fn execute(
        &self,
        input_path: Option<&Path>,
        callbacks: TranscribeCallbacks,
    ) -> Result<TranscribeOutput, PipelineError> {
        let started = Instant::now();

        // Preflight
        let input_path = input_path.ok_or_else(|| {
            PipelineError::Usage("Missing input file. Usage: whisper-scribe <FILE.m4a>".to_string())
        })?;
        let input = validate_input(input_path).await?;
        debug!(path = %input.path().display(), size = input.size_bytes(), "input validated");

        if let Some(ref cb) = callbacks.on_validated {
            cb(&input);
        }

        self.runtime
            .check_available()
            .await
            .map_err(PipelineError::Environment)?;

        let layout = self.prepare_layout().await?;

        // Conversion
        if let Some(ref cb) = callbacks.on_converting_start {
            cb();
        }

        let converted_path = unique_path(
            &layout.working_files_dir(),
            &input.base_name(),
            CONVERTED_EXTENSION,
            self.clock.now(),
        );
        self.converter.convert(&input, &converted_path).await?;
        info!(path = %converted_path.display(), "converted audio");

        if let Some(ref cb) = callbacks.on_converting_end {
            cb(&converted_path);
        }

        // Service readiness
        if let Some(ref cb) = callbacks.on_service_start {
            cb();
        }

        let (endpoint, service_state) = self.ensure_service().await?;

        if let Some(ref cb) = callbacks.on_service_ready {
            cb(&endpoint, service_state);
        }

        // Transcription
        if let Some(ref cb) = callbacks.on_transcribing_start {
            cb();
        }

        let transcript_path = unique_path(
            &layout.transcribed_output_dir(),
            &input.base_name(),
            TRANSCRIPT_EXTENSION,
            self.clock.now(),
        );
        let transcript_bytes = self
            .upload_with_retry(&endpoint, &converted_path, &transcript_path)
            .await?;
        info!(path = %transcript_path.display(), bytes = transcript_bytes, "wrote transcript");

        if let Some(ref cb) = callbacks.on_transcribing_end {
            cb(&transcript_path);
        }

        Ok(TranscribeOutput {
            input,
            converted_path,
            transcript_path,
            transcript_bytes,
            endpoint,
            service_state,
            elapsed: started.elapsed(),
        })
    }

    async fn prepare_layout(&self) -> Result<ResultLayout, PipelineError> {
        let layout = ResultLayout::for_date(&self.settings.output_dir, self.clock.now().date());

        for dir in [layout.working_files_dir(), layout.transcribed_output_dir()] {
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| PipelineError::Output(format!("{}: {}", dir.display(), e)))?;
        }

        Ok(layout)
    }

    /// Allocate a port and bring the backend up while holding the launch lock
    async fn ensure_service(&self) -> Result<(ServiceEndpoint, ServiceState), ServiceError> {
        let policy = ReadinessPolicy {
            timeout: self.settings.startup_timeout.as_std(),
            interval: self.settings.poll_interval.as_std(),
        };

        let _guard = self.launch_lock.acquire(policy.timeout).await?;

        let allocation = allocate_port(
            &self.probe,
            &self.runtime,
            &self.settings.host,
            self.settings.base_port,
            self.settings.max_port_attempts,
        )
        .await?;
        debug!(?allocation, "port allocated");

        ServiceLifecycle::new(&self.runtime, &self.health, &self.settings.host, policy)
            .ensure_running(allocation, &self.stop_flag)
            .await
    }

    /// Upload with linear backoff on transport failures.
    /// A single attempt unless `upload_attempts` says otherwise.
    async fn upload_with_retry(
        &self,
        endpoint: &ServiceEndpoint,
        audio: &Path,
        output: &Path,
    ) -> Result<u64, TranscriptionError> {
        let attempts = self.settings.upload_attempts.max(1);
        let mut attempt: u32 = 1;

        loop {
            match self
                .transcriber
                .transcribe_to_file(endpoint, audio, output)
                .await
            {
                Ok(bytes) => return Ok(bytes),
                Err(e)
                    if e.is_retryable()
                        && attempt < attempts
                        && !self.stop_flag.load(Ordering::SeqCst) =>
                {
                    let backoff = self.settings.poll_interval.as_std() * attempt;
                    warn!(attempt, ?backoff, error = %e, "upload failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
