//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// WhisperScribe - transcribe m4a recordings with a local Whisper service
#[derive(Parser, Debug)]
#[command(name = "whisper-scribe")]
#[command(version)]
#[command(about = "Transcribe .m4a audio files with FFmpeg and a Whisper ASR service in Docker")]
#[command(long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Input audio file (.m4a)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Host where the ASR service is reachable
    #[arg(long, value_name = "HOST", env = "WHISPER_SCRIBE_HOST")]
    pub host: Option<String>,

    /// First port to try for the ASR service
    #[arg(short = 'p', long, value_name = "PORT", env = "WHISPER_SCRIBE_PORT")]
    pub port: Option<u16>,

    /// Whisper model loaded by a newly started service (e.g. base, small)
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Spoken language of the recording
    #[arg(short = 'l', long, value_name = "LANG")]
    pub language: Option<String>,

    /// Directory that receives the transcribe-<YYMMDD> folder
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Container runtime binary
    #[arg(long, value_name = "BIN", env = "WHISPER_SCRIBE_DOCKER")]
    pub docker: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "host",
    "base_port",
    "max_port_attempts",
    "docker_bin",
    "ffmpeg_image",
    "asr_image",
    "asr_model",
    "asr_engine",
    "language",
    "startup_timeout",
    "poll_interval",
    "upload_attempts",
    "output_dir",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::try_parse_from(["whisper-scribe"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.model.is_none());
        assert!(cli.language.is_none());
        assert!(cli.output_dir.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(cli.command.is_none());
    }

    #[test]
    fn cli_parses_input() {
        let cli = Cli::try_parse_from(["whisper-scribe", "meeting.m4a"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("meeting.m4a")));
    }

    #[test]
    fn cli_parses_options() {
        let cli = Cli::try_parse_from([
            "whisper-scribe",
            "--host",
            "127.0.0.1",
            "--port",
            "9100",
            "-m",
            "small",
            "-l",
            "de",
            "-o",
            "/tmp/out",
            "--docker",
            "podman",
            "a.m4a",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(9100));
        assert_eq!(cli.model.as_deref(), Some("small"));
        assert_eq!(cli.language.as_deref(), Some("de"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(cli.docker.as_deref(), Some("podman"));
    }

    #[test]
    fn cli_rejects_bad_port() {
        assert!(Cli::try_parse_from(["whisper-scribe", "--port", "70000", "a.m4a"]).is_err());
    }

    #[test]
    fn cli_counts_verbosity() {
        let cli = Cli::try_parse_from(["whisper-scribe", "-vv", "a.m4a"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parses_config_init() {
        let cli = Cli::try_parse_from(["whisper-scribe", "config", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Init
            })
        ));
        assert!(cli.input.is_none());
    }

    #[test]
    fn cli_parses_config_set() {
        let cli =
            Cli::try_parse_from(["whisper-scribe", "config", "set", "asr_model", "small"]).unwrap();
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "asr_model");
            assert_eq!(value, "small");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("base_port"));
        assert!(is_valid_config_key("startup_timeout"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
