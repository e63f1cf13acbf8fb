//! Collision-free output file naming

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Build `<dir>/<base>-<HHMMSS>.<ext>`, falling back to
/// `<dir>/<base>-<HHMMSS>-<n>.<ext>` with n = 1, 2, ... while the candidate
/// exists.
///
/// Existence is re-checked for every candidate. Nothing is reserved, so the
/// caller must create the file right away.
pub fn unique_path(dir: &Path, base: &str, ext: &str, now: NaiveDateTime) -> PathBuf {
    unique_path_with(dir, base, ext, now, |p| p.exists())
}

/// Same as [`unique_path`] with a custom existence check
pub fn unique_path_with<F>(
    dir: &Path,
    base: &str,
    ext: &str,
    now: NaiveDateTime,
    exists: F,
) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let stem = format!("{}-{}", base, now.format("%H%M%S"));

    let first = dir.join(format!("{}.{}", stem, ext));
    if !exists(&first) {
        return first;
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(format!("{}-{}.{}", stem, counter, ext));
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
