//! Network adapters

mod http_health;
mod tcp_probe;

pub use http_health::HttpHealthCheck;
pub use tcp_probe::TcpPortProbe;
