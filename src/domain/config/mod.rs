//! Configuration value objects

mod app_config;

pub use app_config::{
    AppConfig, PipelineSettings, DEFAULT_ASR_ENGINE, DEFAULT_ASR_IMAGE, DEFAULT_ASR_MODEL,
    DEFAULT_DOCKER_BIN, DEFAULT_FFMPEG_IMAGE, DEFAULT_HOST, DEFAULT_LANGUAGE, DEFAULT_OUTPUT_DIR,
    DEFAULT_UPLOAD_ATTEMPTS,
};
