//! Application layer - Use cases and port interfaces
//!
//! Contains the pipeline stages and trait definitions
//! for external system interactions.

pub mod port_allocator;
pub mod ports;
pub mod preflight;
pub mod service_lifecycle;
pub mod transcribe;

// Re-export use cases
pub use port_allocator::allocate_port;
pub use preflight::validate_input;
pub use service_lifecycle::{
    wait_until, ReadinessPolicy, ServiceError, ServiceLifecycle, WaitOutcome,
};
pub use transcribe::{
    PipelineError, TranscribeCallbacks, TranscribeFileUseCase, TranscribeOutput,
};
