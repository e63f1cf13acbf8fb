//! FFmpeg-in-Docker audio converter adapter

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::application::ports::{AudioConverter, ConversionError};
use crate::domain::config::PipelineSettings;
use crate::domain::input::InputAudioFile;
use crate::infrastructure::container::last_stderr_line;

/// Mount point of the input file's directory inside the container
const INPUT_MOUNT: &str = "/input";

/// Mount point of the working-files directory inside the container
const OUTPUT_MOUNT: &str = "/output";

/// Prefix of converter container names
const CONTAINER_PREFIX: &str = "whisper-scribe-ffmpeg";

/// Distinguishes conversions within one process
static CONVERSION_SEQ: AtomicU32 = AtomicU32::new(0);

fn next_container_name() -> String {
    format!(
        "{}-{}-{}",
        CONTAINER_PREFIX,
        std::process::id(),
        CONVERSION_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

/// Force-removes a named container on drop unless disarmed.
///
/// Killing the `docker run` client does not stop the container it started,
/// so an abandoned conversion would otherwise keep running.
struct ContainerCleanup<'a> {
    docker_bin: &'a str,
    name: &'a str,
    armed: bool,
}

impl<'a> ContainerCleanup<'a> {
    fn new(docker_bin: &'a str, name: &'a str) -> Self {
        Self {
            docker_bin,
            name,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ContainerCleanup<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!(container = %self.name, "removing abandoned converter container");
        let spawned = std::process::Command::new(self.docker_bin)
            .args(["rm", "-f", self.name])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(e) = spawned {
            warn!(container = %self.name, error = %e, "failed to remove converter container");
        }
    }
}

/// Converts audio by running the FFmpeg image in a throwaway container
pub struct FfmpegDockerConverter {
    docker_bin: String,
    image: String,
}

impl FfmpegDockerConverter {
    /// Create a new converter using the given docker binary and FFmpeg image
    pub fn new(docker_bin: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
            image: image.into(),
        }
    }

    /// Create from resolved pipeline settings
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(settings.docker_bin.clone(), settings.ffmpeg_image.clone())
    }

    /// Build docker args for one conversion.
    ///
    /// Directories must be absolute; the image's entrypoint is `ffmpeg`.
    fn build_docker_args(
        &self,
        name: &str,
        input_dir: &Path,
        input_name: &str,
        output_dir: &Path,
        output_name: &str,
    ) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            name.to_string(),
        ];

        // Write the WAV as the invoking user, not root
        if let Some(user) = current_user() {
            args.push("--user".to_string());
            args.push(user);
        }

        args.extend([
            "-v".to_string(),
            format!("{}:{}:ro", input_dir.display(), INPUT_MOUNT),
            "-v".to_string(),
            format!("{}:{}", output_dir.display(), OUTPUT_MOUNT),
            self.image.clone(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-n".to_string(), // Never overwrite
            "-i".to_string(),
            format!("{}/{}", INPUT_MOUNT, input_name),
            "-ar".to_string(),
            "16000".to_string(), // 16kHz sample rate
            "-ac".to_string(),
            "1".to_string(), // Mono
            "-c:a".to_string(),
            "pcm_s16le".to_string(),
            format!("{}/{}", OUTPUT_MOUNT, output_name),
        ]);

        args
    }
}

#[cfg(unix)]
fn current_user() -> Option<String> {
    use nix::unistd::{getgid, getuid};
    Some(format!("{}:{}", getuid(), getgid()))
}

#[cfg(not(unix))]
fn current_user() -> Option<String> {
    None
}

/// Split a path into its absolute parent directory and file name
async fn split_absolute(path: &Path) -> Result<(PathBuf, String), ConversionError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ConversionError::StartFailed(format!("no file name in {}", path.display())))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = fs::canonicalize(&parent)
        .await
        .map_err(|e| ConversionError::StartFailed(format!("{}: {}", parent.display(), e)))?;

    Ok((parent, name))
}

#[async_trait]
impl AudioConverter for FfmpegDockerConverter {
    async fn convert(&self, input: &InputAudioFile, output: &Path) -> Result<(), ConversionError> {
        let (input_dir, input_name) = split_absolute(input.path()).await?;
        let (output_dir, output_name) = split_absolute(output).await?;

        let name = next_container_name();
        let args =
            self.build_docker_args(&name, &input_dir, &input_name, &output_dir, &output_name);
        debug!(bin = %self.docker_bin, ?args, "running converter");

        // Armed until `docker run` returns; dropping this future mid-run
        // removes the container
        let mut cleanup = ContainerCleanup::new(&self.docker_bin, &name);
        let result = Command::new(&self.docker_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;
        cleanup.disarm();
        let result = result.map_err(|e| ConversionError::StartFailed(e.to_string()))?;

        if !result.status.success() {
            return Err(ConversionError::Failed(last_stderr_line(&result.stderr)));
        }

        match fs::metadata(output).await {
            Ok(meta) if meta.is_file() => Ok(()),
            _ => Err(ConversionError::MissingOutput(output.to_path_buf())),
        }
    }
}
