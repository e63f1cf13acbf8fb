//! Advisory file lock serialising backend launch

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::application::ports::{LaunchGuard, LaunchLock, LockError};

/// Default lock file name inside the temp directory
const DEFAULT_LOCK_NAME: &str = "whisper-scribe-launch.lock";

/// Delay between attempts while another process holds the lock
const RETRY_DELAY: Duration = Duration::from_millis(200);

#[cfg(unix)]
type Held = nix::fcntl::Flock<fs::File>;

#[cfg(not(unix))]
type Held = fallback::Held;

/// Outcome of a single acquisition attempt
enum Attempt {
    Acquired(Held),
    Busy(Option<u32>),
}

/// Launch lock backed by an exclusive `flock` on a file in the temp dir.
///
/// The kernel drops the lock when its holder exits, so a crashed run never
/// leaves a stale lock behind. The file itself is kept and records the PID
/// of the current holder for error messages.
pub struct FileLaunchLock {
    path: PathBuf,
}

impl FileLaunchLock {
    /// Create a lock at the default path in the temp directory
    pub fn new() -> Self {
        Self {
            path: std::env::temp_dir().join(DEFAULT_LOCK_NAME),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the lock file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One non-blocking attempt, run off the async executor
    async fn attempt(&self) -> Result<Attempt, LockError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || try_acquire(&path))
            .await
            .map_err(|e| LockError::Io(e.to_string()))?
    }
}

impl Default for FileLaunchLock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LaunchLock for FileLaunchLock {
    async fn acquire(&self, timeout: Duration) -> Result<LaunchGuard, LockError> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.attempt().await? {
                Attempt::Acquired(held) => {
                    debug!(path = %self.path.display(), "launch lock acquired");
                    return Ok(LaunchGuard::new(move || release(held)));
                }
                Attempt::Busy(holder) => {
                    if Instant::now() >= deadline {
                        return Err(LockError::Timeout(holder));
                    }
                    debug!(?holder, "launch lock busy, waiting");
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }
}

/// PID recorded in the lock file, if readable
fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(unix)]
fn try_acquire(path: &Path) -> Result<Attempt, LockError> {
    use nix::errno::Errno;
    use nix::fcntl::{Flock, FlockArg};

    let io = |e: std::io::Error| LockError::Io(format!("{}: {}", path.display(), e));

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(io)?;

    match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
        Ok(held) => {
            held.set_len(0).map_err(io)?;
            write!(&*held, "{}", process::id()).map_err(io)?;
            Ok(Attempt::Acquired(held))
        }
        Err((_, errno)) if errno == Errno::EWOULDBLOCK => Ok(Attempt::Busy(read_holder(path))),
        Err((_, errno)) => Err(LockError::Io(format!("{}: {}", path.display(), errno))),
    }
}

/// Clear the recorded PID, then drop the lock
#[cfg(unix)]
fn release(held: Held) {
    let _ = held.set_len(0);
    drop(held);
}

#[cfg(not(unix))]
fn try_acquire(path: &Path) -> Result<Attempt, LockError> {
    fallback::try_acquire(path)
}

#[cfg(not(unix))]
fn release(held: Held) {
    drop(held);
}

/// Exclusive-create lock for platforms without `flock`. The file is removed
/// on release.
#[cfg(not(unix))]
mod fallback {
    use super::*;
    use std::io::ErrorKind;

    pub struct Held {
        path: PathBuf,
    }

    impl Drop for Held {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    pub(super) fn try_acquire(path: &Path) -> Result<Attempt, LockError> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                write!(file, "{}", process::id())
                    .map_err(|e| LockError::Io(e.to_string()))?;
                Ok(Attempt::Acquired(Held {
                    path: path.to_path_buf(),
                }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Ok(Attempt::Busy(read_holder(path)))
            }
            Err(e) => Err(LockError::Io(e.to_string())),
        }
    }
}
