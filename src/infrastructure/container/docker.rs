//! Docker CLI container runtime adapter

use std::process::{Output, Stdio};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::application::ports::{ContainerRuntime, RuntimeError};
use crate::domain::config::PipelineSettings;
use crate::domain::service::ASR_CONTAINER_PORT;

/// One line of `docker ps --format '{{json .}}'`
#[derive(Debug, Clone, Deserialize)]
struct ContainerSummary {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "Ports", default)]
    ports: String,
}

impl ContainerSummary {
    /// Ports look like `0.0.0.0:9000->9000/tcp, :::9000->9000/tcp`
    fn publishes(&self, host_port: u16) -> bool {
        let needle = format!(":{}->", host_port);
        self.ports.split(',').any(|p| p.trim().contains(&needle))
    }
}

/// Container runtime driven through the `docker` command line
pub struct DockerRuntime {
    docker_bin: String,
    asr_image: String,
    asr_model: String,
    asr_engine: String,
}

impl DockerRuntime {
    /// Create a runtime adapter using the given binary and backend image
    pub fn new(docker_bin: impl Into<String>, asr_image: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
            asr_image: asr_image.into(),
            asr_model: crate::domain::config::DEFAULT_ASR_MODEL.to_string(),
            asr_engine: crate::domain::config::DEFAULT_ASR_ENGINE.to_string(),
        }
    }

    /// Create from resolved pipeline settings
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self {
            docker_bin: settings.docker_bin.clone(),
            asr_image: settings.asr_image.clone(),
            asr_model: settings.asr_model.clone(),
            asr_engine: settings.asr_engine.clone(),
        }
    }

    /// Docker's `publish` filter matches the container-side port, so the host
    /// port is matched against the `Ports` column instead
    fn build_ps_args(&self) -> Vec<String> {
        vec![
            "ps".to_string(),
            "--filter".to_string(),
            format!("ancestor={}", self.asr_image),
            "--filter".to_string(),
            "status=running".to_string(),
            "--format".to_string(),
            "{{json .}}".to_string(),
        ]
    }

    fn build_run_args(&self, port: u16) -> Vec<String> {
        vec![
            "run".to_string(),
            "-d".to_string(),
            "-p".to_string(),
            format!("{}:{}", port, ASR_CONTAINER_PORT),
            "-e".to_string(),
            format!("ASR_MODEL={}", self.asr_model),
            "-e".to_string(),
            format!("ASR_ENGINE={}", self.asr_engine),
            self.asr_image.clone(),
        ]
    }

    fn parse_ps_output(stdout: &str) -> Result<Vec<ContainerSummary>, RuntimeError> {
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| RuntimeError::ParseError(e.to_string()))
            })
            .collect()
    }

    /// Run docker with `args`, capturing output
    async fn run(&self, args: &[String]) -> Result<Output, RuntimeError> {
        debug!(bin = %self.docker_bin, ?args, "running container command");

        Command::new(&self.docker_bin)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RuntimeError::NotFound(self.docker_bin.clone())
                } else {
                    RuntimeError::CommandFailed(e.to_string())
                }
            })
    }
}

/// Last non-empty stderr line, or a fallback
pub(crate) fn last_stderr_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown error")
        .to_string()
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn check_available(&self) -> Result<(), RuntimeError> {
        let args = [
            "info".to_string(),
            "--format".to_string(),
            "{{.ServerVersion}}".to_string(),
        ];
        let output = self.run(&args).await?;

        if !output.status.success() {
            return Err(RuntimeError::NotRunning(last_stderr_line(&output.stderr)));
        }

        debug!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "container runtime available"
        );
        Ok(())
    }

    async fn backend_on_port(&self, port: u16) -> Result<bool, RuntimeError> {
        let output = self.run(&self.build_ps_args()).await?;

        if !output.status.success() {
            return Err(RuntimeError::CommandFailed(format!(
                "docker ps: {}",
                last_stderr_line(&output.stderr)
            )));
        }

        let containers = Self::parse_ps_output(&String::from_utf8_lossy(&output.stdout))?;
        let found = containers.iter().find(|c| c.publishes(port));
        if let Some(container) = found {
            debug!(id = %container.id, image = %container.image, port, "backend found");
        }

        Ok(found.is_some())
    }

    async fn start_backend(&self, port: u16) -> Result<String, RuntimeError> {
        let output = self.run(&self.build_run_args(port)).await?;

        if !output.status.success() {
            return Err(RuntimeError::CommandFailed(format!(
                "docker run: {}",
                last_stderr_line(&output.stderr)
            )));
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(RuntimeError::ParseError(
                "docker run printed no container ID".to_string(),
            ));
        }

        Ok(id)
    }
}
