//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::service::{DEFAULT_BASE_PORT, DEFAULT_MAX_PORT_ATTEMPTS};
use crate::domain::timing::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_DOCKER_BIN: &str = "docker";
pub const DEFAULT_FFMPEG_IMAGE: &str = "jrottenberg/ffmpeg:6-alpine";
pub const DEFAULT_ASR_IMAGE: &str = "onerahmet/openai-whisper-asr-webservice:latest";
pub const DEFAULT_ASR_MODEL: &str = "base";
pub const DEFAULT_ASR_ENGINE: &str = "openai_whisper";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_UPLOAD_ATTEMPTS: u32 = 1;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: Option<String>,
    pub base_port: Option<u16>,
    pub max_port_attempts: Option<u16>,
    pub docker_bin: Option<String>,
    pub ffmpeg_image: Option<String>,
    pub asr_image: Option<String>,
    pub asr_model: Option<String>,
    pub asr_engine: Option<String>,
    pub language: Option<String>,
    pub startup_timeout: Option<String>,
    pub poll_interval: Option<String>,
    pub upload_attempts: Option<u32>,
    pub output_dir: Option<String>,
}

/// Fully resolved settings handed to every pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub host: String,
    pub base_port: u16,
    pub max_port_attempts: u16,
    pub docker_bin: String,
    pub ffmpeg_image: String,
    pub asr_image: String,
    pub asr_model: String,
    pub asr_engine: String,
    pub language: String,
    pub startup_timeout: Duration,
    pub poll_interval: Duration,
    pub upload_attempts: u32,
    pub output_dir: PathBuf,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            host: Some(DEFAULT_HOST.to_string()),
            base_port: Some(DEFAULT_BASE_PORT),
            max_port_attempts: Some(DEFAULT_MAX_PORT_ATTEMPTS),
            docker_bin: Some(DEFAULT_DOCKER_BIN.to_string()),
            ffmpeg_image: Some(DEFAULT_FFMPEG_IMAGE.to_string()),
            asr_image: Some(DEFAULT_ASR_IMAGE.to_string()),
            asr_model: Some(DEFAULT_ASR_MODEL.to_string()),
            asr_engine: Some(DEFAULT_ASR_ENGINE.to_string()),
            language: Some(DEFAULT_LANGUAGE.to_string()),
            startup_timeout: Some(Duration::default_startup_timeout().to_string()),
            poll_interval: Some(Duration::default_poll_interval().to_string()),
            upload_attempts: Some(DEFAULT_UPLOAD_ATTEMPTS),
            output_dir: Some(DEFAULT_OUTPUT_DIR.to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            host: other.host.or(self.host),
            base_port: other.base_port.or(self.base_port),
            max_port_attempts: other.max_port_attempts.or(self.max_port_attempts),
            docker_bin: other.docker_bin.or(self.docker_bin),
            ffmpeg_image: other.ffmpeg_image.or(self.ffmpeg_image),
            asr_image: other.asr_image.or(self.asr_image),
            asr_model: other.asr_model.or(self.asr_model),
            asr_engine: other.asr_engine.or(self.asr_engine),
            language: other.language.or(self.language),
            startup_timeout: other.startup_timeout.or(self.startup_timeout),
            poll_interval: other.poll_interval.or(self.poll_interval),
            upload_attempts: other.upload_attempts.or(self.upload_attempts),
            output_dir: other.output_dir.or(self.output_dir),
        }
    }

    /// Resolve into typed settings, filling gaps with defaults.
    /// Malformed values are reported, never replaced.
    pub fn resolve(&self) -> Result<PipelineSettings, ConfigError> {
        let startup_timeout = parse_duration(
            "startup_timeout",
            self.startup_timeout.as_deref(),
            Duration::default_startup_timeout(),
        )?;
        let poll_interval = parse_duration(
            "poll_interval",
            self.poll_interval.as_deref(),
            Duration::default_poll_interval(),
        )?;

        let max_port_attempts = self.max_port_attempts.unwrap_or(DEFAULT_MAX_PORT_ATTEMPTS);
        if max_port_attempts == 0 {
            return Err(ConfigError::ValidationError {
                key: "max_port_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let upload_attempts = self.upload_attempts.unwrap_or(DEFAULT_UPLOAD_ATTEMPTS);
        if upload_attempts == 0 {
            return Err(ConfigError::ValidationError {
                key: "upload_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(PipelineSettings {
            host: or_default(&self.host, DEFAULT_HOST),
            base_port: self.base_port.unwrap_or(DEFAULT_BASE_PORT),
            max_port_attempts,
            docker_bin: or_default(&self.docker_bin, DEFAULT_DOCKER_BIN),
            ffmpeg_image: or_default(&self.ffmpeg_image, DEFAULT_FFMPEG_IMAGE),
            asr_image: or_default(&self.asr_image, DEFAULT_ASR_IMAGE),
            asr_model: or_default(&self.asr_model, DEFAULT_ASR_MODEL),
            asr_engine: or_default(&self.asr_engine, DEFAULT_ASR_ENGINE),
            language: or_default(&self.language, DEFAULT_LANGUAGE),
            startup_timeout,
            poll_interval,
            upload_attempts,
            output_dir: PathBuf::from(or_default(&self.output_dir, DEFAULT_OUTPUT_DIR)),
        })
    }
}

fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

fn parse_duration(
    key: &str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(s) => s.parse().map_err(|e: crate::domain::error::DurationParseError| {
            ConfigError::ValidationError {
                key: key.to_string(),
                message: e.to_string(),
            }
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_expected_settings() {
        let settings = AppConfig::defaults().resolve().unwrap();
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.base_port, 9000);
        assert_eq!(settings.max_port_attempts, 100);
        assert_eq!(settings.docker_bin, "docker");
        assert_eq!(settings.language, "en");
        assert_eq!(settings.asr_model, "base");
        assert_eq!(settings.startup_timeout.as_secs(), 120);
        assert_eq!(settings.poll_interval.as_secs(), 2);
        assert_eq!(settings.upload_attempts, 1);
        assert_eq!(settings.output_dir, PathBuf::from("."));
    }

    #[test]
    fn empty_resolves_like_defaults() {
        assert_eq!(
            AppConfig::empty().resolve().unwrap(),
            AppConfig::defaults().resolve().unwrap()
        );
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            host: Some("localhost".to_string()),
            base_port: Some(9000),
            language: Some("en".to_string()),
            ..Default::default()
        };

        let other = AppConfig {
            host: None,
            base_port: Some(9100),
            language: Some("de".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.host, Some("localhost".to_string()));
        assert_eq!(merged.base_port, Some(9100));
        assert_eq!(merged.language, Some("de".to_string()));
    }

    #[test]
    fn merge_preserves_base_when_other_is_empty() {
        let base = AppConfig {
            asr_model: Some("small".to_string()),
            upload_attempts: Some(3),
            ..Default::default()
        };

        let merged = base.clone().merge(AppConfig::empty());
        assert_eq!(merged, base);
    }

    #[test]
    fn resolve_reports_bad_duration() {
        let config = AppConfig {
            startup_timeout: Some("forever".to_string()),
            ..Default::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("startup_timeout"));
    }

    #[test]
    fn resolve_rejects_zero_attempts() {
        let config = AppConfig {
            max_port_attempts: Some(0),
            ..Default::default()
        };
        assert!(config.resolve().is_err());

        let config = AppConfig {
            upload_attempts: Some(0),
            ..Default::default()
        };
        assert!(config.resolve().is_err());
    }

    #[test]
    fn blank_strings_fall_back_to_defaults() {
        let config = AppConfig {
            host: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve().unwrap().host, "localhost");
    }
}
