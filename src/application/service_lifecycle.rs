//! Backend service lifecycle: reuse, launch and readiness polling

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::domain::service::{PortAllocation, ServiceEndpoint, ServiceState};

use super::ports::{ContainerRuntime, HealthCheck, LockError, RuntimeError};

/// Errors while bringing up the transcription backend
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("No available port: tried {attempts} ports starting at {start}")]
    NoPortAvailable { start: u16, attempts: u16 },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("Failed to start service on port {port}: not ready after {timeout:?}")]
    StartTimeout { port: u16, timeout: Duration },

    #[error("Cancelled while waiting for the service to start")]
    Cancelled,
}

/// How long to wait for a backend to become ready, and how often to look
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

/// Result of [`wait_until`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    TimedOut,
    Cancelled,
}

/// Poll `predicate` every `policy.interval` until it returns true, the
/// deadline passes, or `cancel` is set. The predicate is always evaluated at
/// least once.
pub async fn wait_until<F, Fut>(
    mut predicate: F,
    policy: ReadinessPolicy,
    cancel: &AtomicBool,
) -> Result<WaitOutcome, RuntimeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, RuntimeError>>,
{
    let deadline = Instant::now() + policy.timeout;

    loop {
        if cancel.load(Ordering::SeqCst) {
            return Ok(WaitOutcome::Cancelled);
        }

        if predicate().await? {
            return Ok(WaitOutcome::Ready);
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(WaitOutcome::TimedOut);
        }

        sleep(policy.interval.min(deadline - now)).await;
    }
}

/// Drives the backend from absent or starting to running
pub struct ServiceLifecycle<'a, R: ?Sized, H: ?Sized> {
    runtime: &'a R,
    health: &'a H,
    host: &'a str,
    policy: ReadinessPolicy,
}

impl<'a, R, H> ServiceLifecycle<'a, R, H>
where
    R: ContainerRuntime + ?Sized,
    H: HealthCheck + ?Sized,
{
    pub fn new(runtime: &'a R, health: &'a H, host: &'a str, policy: ReadinessPolicy) -> Self {
        Self {
            runtime,
            health,
            host,
            policy,
        }
    }

    /// Guarantee a reachable backend on the allocated port.
    ///
    /// A reused port is trusted as running. A free port gets a new backend
    /// container unless one is already visible there (for example, still
    /// loading its model), and is then polled until the container runs and
    /// the ASR application answers HTTP.
    pub async fn ensure_running(
        &self,
        allocation: PortAllocation,
        cancel: &AtomicBool,
    ) -> Result<(ServiceEndpoint, ServiceState), ServiceError> {
        let port = allocation.port();
        let endpoint = ServiceEndpoint::new(self.host, port);

        let state = match allocation {
            PortAllocation::Reused(_) => {
                info!(%endpoint, "backend already running");
                return Ok((endpoint, ServiceState::AlreadyRunning));
            }
            PortAllocation::Free(_) if self.runtime.backend_on_port(port).await? => {
                info!(%endpoint, "backend container present, waiting for it to listen");
                ServiceState::AlreadyRunning
            }
            PortAllocation::Free(_) => {
                let id = self.runtime.start_backend(port).await?;
                info!(%endpoint, container = %id, "launched backend");
                ServiceState::Started
            }
        };

        match self.wait_ready(&endpoint, cancel).await? {
            WaitOutcome::Ready => Ok((endpoint, state)),
            WaitOutcome::TimedOut => Err(ServiceError::StartTimeout {
                port,
                timeout: self.policy.timeout,
            }),
            WaitOutcome::Cancelled => Err(ServiceError::Cancelled),
        }
    }

    async fn wait_ready(
        &self,
        endpoint: &ServiceEndpoint,
        cancel: &AtomicBool,
    ) -> Result<WaitOutcome, RuntimeError> {
        let port = endpoint.port();
        wait_until(
            move || async move {
                let running = self.runtime.backend_on_port(port).await?;
                let ready = running && self.health.is_ready(endpoint).await;
                debug!(port, running, ready, "readiness check");
                Ok(ready)
            },
            self.policy,
            cancel,
        )
        .await
    }
}
