//! ASR service endpoint and port allocation value objects

use std::fmt;

/// Port the ASR web service listens on inside its container
pub const ASR_CONTAINER_PORT: u16 = 9000;

/// Default host port to start probing from
pub const DEFAULT_BASE_PORT: u16 = 9000;

/// Default number of ports probed before giving up
pub const DEFAULT_MAX_PORT_ATTEMPTS: u16 = 100;

/// Where the running transcription backend can be reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    host: String,
    port: u16,
}

impl ServiceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `http://<host>:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// `http://<host>:<port>/asr`
    pub fn asr_url(&self) -> String {
        format!("{}/asr", self.base_url())
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Outcome of scanning for a backend port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortAllocation {
    /// Nothing listens on this port; a backend may be launched on it
    Free(u16),
    /// A backend container already serves this port
    Reused(u16),
}

impl PortAllocation {
    pub fn port(&self) -> u16 {
        match self {
            Self::Free(port) | Self::Reused(port) => *port,
        }
    }
}

/// How the backend became available for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// An existing backend was reused
    AlreadyRunning,
    /// A backend was launched by this run
    Started,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "reused"),
            Self::Started => write!(f, "started"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        let endpoint = ServiceEndpoint::new("localhost", 9001);
        assert_eq!(endpoint.base_url(), "http://localhost:9001");
        assert_eq!(endpoint.asr_url(), "http://localhost:9001/asr");
        assert_eq!(endpoint.to_string(), "localhost:9001");
    }

    #[test]
    fn allocation_port() {
        assert_eq!(PortAllocation::Free(9000).port(), 9000);
        assert_eq!(PortAllocation::Reused(9003).port(), 9003);
    }
}
