//! Cross-process launch lock

mod file_lock;

pub use file_lock::FileLaunchLock;
