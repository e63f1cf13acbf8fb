//! Clock port interface

use chrono::NaiveDateTime;

/// Source of local wall-clock time used for output naming
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
