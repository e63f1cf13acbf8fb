//! Network probe port interfaces

use async_trait::async_trait;

use crate::domain::service::ServiceEndpoint;

/// Port for checking whether something listens on a TCP port
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// True when `host:port` accepts TCP connections.
    async fn is_listening(&self, host: &str, port: u16) -> bool;
}

/// Port for asking the ASR application itself whether it serves requests.
///
/// An accepted TCP connection is not enough: a container proxy can accept
/// on the host port while the model is still loading.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// True when the service at `endpoint` answers HTTP successfully.
    async fn is_ready(&self, endpoint: &ServiceEndpoint) -> bool;
}
