//! Ctrl-C handling for a transcription run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Raises a shared stop flag when the user presses Ctrl-C
pub struct ShutdownSignal {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a handler that raises `flag`
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { shutdown: flag }
    }

    /// Resolve once Ctrl-C arrives, raising the flag first.
    ///
    /// Never resolves if the handler cannot be installed.
    pub async fn wait(&self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => self.shutdown.store(true, Ordering::SeqCst),
            Err(e) => {
                warn!(error = %e, "failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
        }
    }
}
