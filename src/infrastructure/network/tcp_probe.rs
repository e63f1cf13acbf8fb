//! TCP connect port probe

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::application::ports::PortProbe;

/// Default time allowed for a probe connection
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Decides a port is in use when a TCP connection to it succeeds
pub struct TcpPortProbe {
    connect_timeout: Duration,
}

impl TcpPortProbe {
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Default for TcpPortProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PortProbe for TcpPortProbe {
    async fn is_listening(&self, host: &str, port: u16) -> bool {
        matches!(
            timeout(self.connect_timeout, TcpStream::connect((host, port))).await,
            Ok(Ok(_))
        )
    }
}
