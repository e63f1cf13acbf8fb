//! Input audio domain

mod input_audio;

pub use input_audio::{InputAudioFile, INPUT_EXTENSION, MIN_INPUT_BYTES};
