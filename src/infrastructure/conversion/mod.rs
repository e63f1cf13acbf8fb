//! Audio conversion adapters

mod ffmpeg_docker;

pub use ffmpeg_docker::FfmpegDockerConverter;
