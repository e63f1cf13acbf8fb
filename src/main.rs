//! WhisperScribe CLI entry point

use std::process::ExitCode;

use clap::Parser;

use whisper_scribe::cli::{
    app::{cli_config, load_merged_config, run_transcribe, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging::init_tracing,
    presenter::Presenter,
};
use whisper_scribe::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    // Debug logs and a live spinner would interleave on stderr
    let presenter = if cli.verbose > 1 {
        Presenter::without_spinner()
    } else {
        Presenter::new()
    };
    let store = XdgConfigStore::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command.take() {
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    let config = match load_merged_config(&store, cli_config(&cli)).await {
        Ok(config) => config,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    run_transcribe(cli.input.as_deref(), settings, presenter).await
}
