//! WhisperScribe - transcribe m4a recordings with a local Whisper service
//!
//! This crate validates an input recording, converts it to 16 kHz mono WAV
//! with FFmpeg in a container, makes sure a Whisper ASR web service is
//! running in Docker, and stores the returned transcript next to the
//! converted audio in a dated result directory.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, output layout, configuration and errors
//! - **Application**: Pipeline stages, use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (Docker, FFmpeg, Whisper ASR, etc.)
//! - **CLI**: Command-line interface, argument parsing, logging and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
