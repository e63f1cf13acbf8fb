//! Timing value objects

mod duration;

pub use duration::{Duration, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_STARTUP_TIMEOUT_SECS};
