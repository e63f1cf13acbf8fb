//! Main app runner for a transcription run

use std::path::Path;
use std::process::ExitCode;

use crate::application::ports::ConfigStore;
use crate::application::{PipelineError, TranscribeCallbacks, TranscribeFileUseCase};
use crate::domain::config::{AppConfig, PipelineSettings};
use crate::domain::error::ConfigError;
use crate::domain::input::InputAudioFile;
use crate::domain::service::{ServiceEndpoint, ServiceState};
use crate::infrastructure::{
    DockerRuntime, FfmpegDockerConverter, FileLaunchLock, HttpHealthCheck, SystemClock,
    TcpPortProbe, WhisperAsrTranscriber,
};

use super::args::Cli;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;

/// Run the pipeline for `input` and report the outcome
pub async fn run_transcribe(
    input: Option<&Path>,
    settings: PipelineSettings,
    presenter: Presenter,
) -> ExitCode {
    // Create adapters
    let runtime = DockerRuntime::from_settings(&settings);
    let converter = FfmpegDockerConverter::from_settings(&settings);
    let probe = TcpPortProbe::new();
    let health = HttpHealthCheck::new();
    let transcriber = WhisperAsrTranscriber::with_language(settings.language.clone());
    let launch_lock = FileLaunchLock::new();

    let use_case = TranscribeFileUseCase::new(
        runtime,
        converter,
        probe,
        health,
        transcriber,
        launch_lock,
        SystemClock,
        settings,
    );

    let shutdown = ShutdownSignal::new(use_case.stop_flag());

    let spinner = presenter.start_spinner("Checking input...");
    let callbacks = spinner_callbacks(presenter, &spinner);

    let result = tokio::select! {
        result = use_case.execute(input, callbacks) => result,
        _ = shutdown.wait() => {
            presenter.stop_spinner(&spinner);
            presenter.warn("Interrupted");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    presenter.stop_spinner(&spinner);

    match result {
        Ok(output) => {
            // Transcript path is the only stdout output
            presenter.output(&output.transcript_path.to_string_lossy());

            if output.transcript_bytes == 0 {
                presenter.warn("The service returned an empty transcript");
            }
            presenter.success(&format!(
                "Transcribed {} in {}",
                output.input.path().display(),
                presenter.format_elapsed(output.elapsed)
            ));

            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            if let PipelineError::Upload(_) = e {
                presenter.info("The converted audio was kept in the working-files directory");
            }
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Stage callbacks driving the spinner
fn spinner_callbacks(presenter: Presenter, spinner: &indicatif::ProgressBar) -> TranscribeCallbacks {
    let validated = spinner.clone();
    let converting = spinner.clone();
    let converted = spinner.clone();
    let service = spinner.clone();
    let ready = spinner.clone();
    let transcribing = spinner.clone();

    TranscribeCallbacks {
        on_validated: Some(Box::new(move |input: &InputAudioFile| {
            presenter.step_done(
                &validated,
                &format!(
                    "Input {} ({})",
                    input.path().display(),
                    input.human_readable_size()
                ),
            );
            validated.set_message("Checking Docker...");
        })),
        on_converting_start: Some(Box::new(move || {
            converting.set_message("Converting audio...");
        })),
        on_converting_end: Some(Box::new(move |path: &Path| {
            presenter.step_done(&converted, &format!("Converted to {}", path.display()));
        })),
        on_service_start: Some(Box::new(move || {
            service.set_message("Waiting for the ASR service...");
        })),
        on_service_ready: Some(Box::new(
            move |endpoint: &ServiceEndpoint, state: ServiceState| {
                presenter.step_done(&ready, &format!("ASR service {} on {}", state, endpoint));
            },
        )),
        on_transcribing_start: Some(Box::new(move || {
            transcribing.set_message("Transcribing...");
        })),
        on_transcribing_end: None,
    }
}

/// Config values given on the command line (or through its env fallbacks)
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        host: cli.host.clone(),
        base_port: cli.port,
        docker_bin: cli.docker.clone(),
        asr_model: cli.model.clone(),
        language: cli.language.clone(),
        output_dir: cli
            .output_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        ..Default::default()
    }
}

/// Load and merge configuration from file and CLI.
///
/// Environment variables reach the CLI layer through clap, so the
/// precedence is defaults < file < env < flags.
pub async fn load_merged_config<S: ConfigStore>(
    store: &S,
    cli_config: AppConfig,
) -> Result<AppConfig, ConfigError> {
    let file_config = store.load().await?;

    Ok(AppConfig::defaults().merge(file_config).merge(cli_config))
}
