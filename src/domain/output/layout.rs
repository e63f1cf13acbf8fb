//! Result directory layout

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Prefix of the per-day result directory
pub const RESULT_DIR_PREFIX: &str = "transcribe";

/// Subdirectory holding converted intermediate audio
pub const WORKING_FILES_DIR: &str = "working-files";

/// Subdirectory holding finished transcripts
pub const TRANSCRIBED_OUTPUT_DIR: &str = "transcribed-output";

/// Paths of one day's result tree:
///
/// ```text
/// <root>/transcribe-<YYMMDD>/
///   working-files/
///   transcribed-output/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLayout {
    result_dir: PathBuf,
}

impl ResultLayout {
    /// Layout for the given day below `root`
    pub fn for_date(root: impl AsRef<Path>, date: NaiveDate) -> Self {
        let name = format!("{}-{}", RESULT_DIR_PREFIX, date.format("%y%m%d"));
        Self {
            result_dir: root.as_ref().join(name),
        }
    }

    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    pub fn working_files_dir(&self) -> PathBuf {
        self.result_dir.join(WORKING_FILES_DIR)
    }

    pub fn transcribed_output_dir(&self) -> PathBuf {
        self.result_dir.join(TRANSCRIBED_OUTPUT_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_names_follow_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let layout = ResultLayout::for_date("/data", date);

        assert_eq!(layout.result_dir(), Path::new("/data/transcribe-240307"));
        assert_eq!(
            layout.working_files_dir(),
            PathBuf::from("/data/transcribe-240307/working-files")
        );
        assert_eq!(
            layout.transcribed_output_dir(),
            PathBuf::from("/data/transcribe-240307/transcribed-output")
        );
    }
}
