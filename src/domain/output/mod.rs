//! Output artifacts: result directory layout and unique file names

mod layout;
mod unique_name;

pub use layout::{ResultLayout, RESULT_DIR_PREFIX, TRANSCRIBED_OUTPUT_DIR, WORKING_FILES_DIR};
pub use unique_name::{unique_path, unique_path_with};
