//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like Docker, FFmpeg and the
//! Whisper ASR web service.

pub mod clock;
pub mod config;
pub mod container;
pub mod conversion;
pub mod lock;
pub mod network;
pub mod transcription;

// Re-export adapters
pub use clock::SystemClock;
pub use config::XdgConfigStore;
pub use container::DockerRuntime;
pub use conversion::FfmpegDockerConverter;
pub use lock::FileLaunchLock;
pub use network::{HttpHealthCheck, TcpPortProbe};
pub use transcription::WhisperAsrTranscriber;
