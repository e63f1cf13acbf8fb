//! Transcription adapters

mod whisper_asr;

pub use whisper_asr::WhisperAsrTranscriber;
