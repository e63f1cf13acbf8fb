//! Cross-process launch lock port interface

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Lock errors
#[derive(Debug, Clone, Error)]
pub enum LockError {
    #[error(
        "Timed out waiting for another whisper-scribe run ({}) to finish starting the service",
        holder_label(.0)
    )]
    Timeout(Option<u32>),

    #[error("Launch lock error: {0}")]
    Io(String),
}

fn holder_label(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!("PID {}", pid),
        None => "unknown PID".to_string(),
    }
}

/// Held lock; released when dropped
pub struct LaunchGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LaunchGuard {
    /// Guard that runs `release` on drop
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard with nothing to release
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl std::fmt::Debug for LaunchGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchGuard")
            .field("held", &self.release.is_some())
            .finish()
    }
}

impl Drop for LaunchGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Port serialising port discovery and backend launch across processes
#[async_trait]
pub trait LaunchLock: Send + Sync {
    /// Wait up to `timeout` for exclusive ownership of the launch step.
    async fn acquire(&self, timeout: Duration) -> Result<LaunchGuard, LockError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn guard_releases_on_drop() {
        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);
        let guard = LaunchGuard::new(move || flag.store(true, Ordering::SeqCst));

        assert!(!released.load(Ordering::SeqCst));
        drop(guard);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn timeout_names_holder_when_known() {
        assert!(LockError::Timeout(Some(4242)).to_string().contains("PID 4242"));
        assert!(LockError::Timeout(None).to_string().contains("unknown PID"));
    }
}
