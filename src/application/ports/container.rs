//! Container runtime port interface

use async_trait::async_trait;
use thiserror::Error;

/// Container runtime errors
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("Container runtime '{0}' not found. Is Docker installed?")]
    NotFound(String),

    #[error("Container runtime is not running: {0}")]
    NotRunning(String),

    #[error("Container command failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected container runtime output: {0}")]
    ParseError(String),
}

/// Port for the container runtime hosting the ASR backend
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Check that the runtime daemon answers.
    async fn check_available(&self) -> Result<(), RuntimeError>;

    /// Whether a running backend container publishes `port` on the host.
    async fn backend_on_port(&self, port: u16) -> Result<bool, RuntimeError>;

    /// Launch a detached backend container published on `port`.
    ///
    /// # Returns
    /// The new container's ID
    async fn start_backend(&self, port: u16) -> Result<String, RuntimeError>;
}
