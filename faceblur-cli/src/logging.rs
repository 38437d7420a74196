// ============================================================================
// faceblur-cli/src/logging.rs
// ============================================================================
//
// LOGGING UTILITIES: Helper Functions for Logging
//
// The log4rs configuration itself lives in faceblur_core::logging; the CLI
// only decides where the log file goes and at which level.
//
// AI-ASSISTANT-INFO: Logging setup and timestamp helper for the CLI

use crate::error::{CliErrorContext, CliResult};

use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let name = format!("faceblur_{}.log", faceblur_cli::logging::get_timestamp());
/// assert!(name.starts_with("faceblur_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Creates `log_dir` if needed and returns the path of this run's log file.
pub fn prepare_log_file(log_dir: &Path) -> CliResult<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .cli_with_context(|| format!("Failed to create log directory '{}'", log_dir.display()))?;
    Ok(faceblur_core::logging::log_file_path(log_dir, &get_timestamp()))
}

/// Installs the logger for this process. Failures are reported on stderr
/// and the run continues without logging.
pub fn init(log_file: Option<&Path>, verbose: bool) -> LevelFilter {
    let level = faceblur_core::logging::level_for(verbose);
    if let Err(e) = faceblur_core::logging::setup_logging(log_file, level) {
        eprintln!("Failed to initialize logging: {e:#}");
    }
    level
}
