//! Backend port discovery

use tracing::debug;

use crate::domain::service::PortAllocation;

use super::ports::{ContainerRuntime, PortProbe};
use super::service_lifecycle::ServiceError;

/// Scan `max_attempts` ports upward from `base_port` on `host`.
///
/// Returns the first port nothing listens on, or the first busy port that a
/// running backend container publishes, whichever comes first. Busy ports held
/// by anything else are skipped. The scan never wraps past 65535.
pub async fn allocate_port<P, R>(
    probe: &P,
    runtime: &R,
    host: &str,
    base_port: u16,
    max_attempts: u16,
) -> Result<PortAllocation, ServiceError>
where
    P: PortProbe + ?Sized,
    R: ContainerRuntime + ?Sized,
{
    let mut tried: u16 = 0;

    for offset in 0..max_attempts {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        tried += 1;

        if !probe.is_listening(host, port).await {
            debug!(port, "port is free");
            return Ok(PortAllocation::Free(port));
        }

        if runtime.backend_on_port(port).await? {
            debug!(port, "reusing running backend");
            return Ok(PortAllocation::Reused(port));
        }

        debug!(port, "port taken by another process");
    }

    Err(ServiceError::NoPortAvailable {
        start: base_port,
        attempts: tried,
    })
}
