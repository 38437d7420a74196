//! Logging setup for faceblur.
//!
//! Builds a `log4rs` configuration with a console appender and, when a log
//! directory is given, a timestamped file appender. The console shows the
//! bare message because the terminal output helpers do their own layout; the
//! file gets timestamps and levels.
//!
//! Without verbose output the console only carries the terminal output lines
//! and warnings; everything else at the configured level goes to the file.

use anyhow::Result;
use crate::terminal_output::TERMINAL_TARGET;
use log::{Level, LevelFilter, Record};
use log4rs::{
    append::{console::ConsoleAppender, console::Target, file::FileAppender},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::{Filter, Response},
};
use std::path::{Path, PathBuf};

/// Pattern used for log files.
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {m}{n}";

/// Console level for the verbosity flag.
#[must_use]
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Keeps the console to terminal output and warnings unless debug output
/// was asked for.
#[derive(Debug)]
struct ConsoleFilter {
    level: LevelFilter,
}

impl Filter for ConsoleFilter {
    fn filter(&self, record: &Record) -> Response {
        let shown = record.target() == TERMINAL_TARGET
            || record.level() <= Level::Warn
            || self.level >= LevelFilter::Debug;
        if shown {
            Response::Neutral
        } else {
            Response::Reject
        }
    }
}

/// Log file path `faceblur_<timestamp>.log` inside `log_dir`.
#[must_use]
pub fn log_file_path(log_dir: &Path, timestamp: &str) -> PathBuf {
    log_dir.join(format!("faceblur_{timestamp}.log"))
}

/// Builds the logging configuration without installing it.
pub fn build_config(log_file: Option<&Path>, level: LevelFilter) -> Result<Config> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();

    let mut builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ConsoleFilter { level }))
            .build("console", Box::new(console)),
    );
    let mut root = Root::builder().appender("console");

    if let Some(log_file) = log_file {
        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file_appender = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(log_file)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file_appender)));
        root = root.appender("file");
    }

    Ok(builder.build(root.build(level))?)
}

/// Installs the global logger. Fails if one is already installed.
pub fn setup_logging(log_file: Option<&Path>, level: LevelFilter) -> Result<()> {
    let config = build_config(log_file, level)?;
    log4rs::init_config(config)?;
    log::debug!("Logger initialized with level: {}", level);
    Ok(())
}
