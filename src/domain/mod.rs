//! Domain layer - Core business logic
//!
//! Contains value objects and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod service;
pub mod timing;

// Re-export common types
pub use config::{AppConfig, PipelineSettings};
pub use error::*;
pub use input::InputAudioFile;
pub use output::{unique_path, ResultLayout};
pub use service::{PortAllocation, ServiceEndpoint, ServiceState};
pub use timing::Duration;
