//! Transcription backend domain

mod endpoint;

pub use endpoint::{
    PortAllocation, ServiceEndpoint, ServiceState, ASR_CONTAINER_PORT, DEFAULT_BASE_PORT,
    DEFAULT_MAX_PORT_ATTEMPTS,
};
