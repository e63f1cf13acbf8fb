//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::timing::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match config_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = config_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

/// Current value of `key` as text
fn config_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "host" => config.host.clone(),
        "base_port" => config.base_port.map(|v| v.to_string()),
        "max_port_attempts" => config.max_port_attempts.map(|v| v.to_string()),
        "docker_bin" => config.docker_bin.clone(),
        "ffmpeg_image" => config.ffmpeg_image.clone(),
        "asr_image" => config.asr_image.clone(),
        "asr_model" => config.asr_model.clone(),
        "asr_engine" => config.asr_engine.clone(),
        "language" => config.language.clone(),
        "startup_timeout" => config.startup_timeout.clone(),
        "poll_interval" => config.poll_interval.clone(),
        "upload_attempts" => config.upload_attempts.map(|v| v.to_string()),
        "output_dir" => config.output_dir.clone(),
        _ => None,
    }
}

/// Validate `value` for `key` and store it
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    let text = || -> Result<Option<String>, ConfigError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(invalid("Value must not be empty".to_string()))
        } else {
            Ok(Some(trimmed.to_string()))
        }
    };

    match key {
        "host" => config.host = text()?,
        "docker_bin" => config.docker_bin = text()?,
        "ffmpeg_image" => config.ffmpeg_image = text()?,
        "asr_image" => config.asr_image = text()?,
        "asr_model" => config.asr_model = text()?,
        "asr_engine" => config.asr_engine = text()?,
        "language" => config.language = text()?,
        "output_dir" => config.output_dir = text()?,
        "base_port" => {
            let port = value
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| invalid("Value must be a port between 1 and 65535".to_string()))?;
            config.base_port = Some(port);
        }
        "max_port_attempts" => {
            config.max_port_attempts = Some(parse_positive(value).map_err(invalid)?);
        }
        "upload_attempts" => {
            config.upload_attempts = Some(parse_positive(value).map_err(invalid)?);
        }
        "startup_timeout" | "poll_interval" => {
            let duration: Duration = value
                .trim()
                .parse()
                .map_err(|e: crate::domain::error::DurationParseError| invalid(e.to_string()))?;
            let stored = Some(duration.to_string());
            if key == "startup_timeout" {
                config.startup_timeout = stored;
            } else {
                config.poll_interval = stored;
            }
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }

    Ok(())
}

/// Parse a count that must be at least 1
fn parse_positive<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
{
    match value.trim().parse::<T>() {
        Ok(n) if n >= T::from(1u8) => Ok(n),
        _ => Err("Value must be a whole number of at least 1".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_text_value() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "asr_model", " small ").unwrap();
        assert_eq!(config.asr_model, Some("small".to_string()));
    }

    #[test]
    fn apply_rejects_empty_text() {
        let mut config = AppConfig::empty();
        assert!(apply_value(&mut config, "host", "  ").is_err());
        assert!(config.host.is_none());
    }

    #[test]
    fn apply_port_values() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "base_port", "9100").unwrap();
        assert_eq!(config.base_port, Some(9100));

        assert!(apply_value(&mut config, "base_port", "0").is_err());
        assert!(apply_value(&mut config, "base_port", "65536").is_err());
        assert!(apply_value(&mut config, "base_port", "http").is_err());
        assert_eq!(config.base_port, Some(9100));
    }

    #[test]
    fn apply_attempt_counts() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "upload_attempts", "3").unwrap();
        apply_value(&mut config, "max_port_attempts", "20").unwrap();
        assert_eq!(config.upload_attempts, Some(3));
        assert_eq!(config.max_port_attempts, Some(20));

        assert!(apply_value(&mut config, "upload_attempts", "0").is_err());
        assert!(apply_value(&mut config, "max_port_attempts", "-1").is_err());
    }

    #[test]
    fn apply_duration_is_normalised() {
        let mut config = AppConfig::empty();
        apply_value(&mut config, "startup_timeout", "90s").unwrap();
        assert_eq!(config.startup_timeout, Some("1m30s".to_string()));

        let err = apply_value(&mut config, "poll_interval", "soon").unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn config_value_reads_every_key() {
        let config = AppConfig::defaults();
        for key in VALID_CONFIG_KEYS {
            assert!(config_value(&config, key).is_some(), "missing {}", key);
        }
        assert!(config_value(&AppConfig::empty(), "host").is_none());
    }

    #[test]
    fn unknown_key_rejected() {
        let err = check_key("api_key").unwrap_err();
        assert!(err.to_string().contains("Unknown key"));
    }
}
