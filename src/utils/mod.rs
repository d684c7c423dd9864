pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{generate_backup_filename, next_backup_path};
pub use progress::ProgressReporter;
