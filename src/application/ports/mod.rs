//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod clock;
pub mod config;
pub mod container;
pub mod converter;
pub mod launch_lock;
pub mod network;
pub mod transcriber;

// Re-export common types
pub use clock::Clock;
pub use config::ConfigStore;
pub use container::{ContainerRuntime, RuntimeError};
pub use converter::{AudioConverter, ConversionError};
pub use launch_lock::{LaunchGuard, LaunchLock, LockError};
pub use network::{HealthCheck, PortProbe};
pub use transcriber::{Transcriber, TranscriptionError};
