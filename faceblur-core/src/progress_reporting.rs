//! Progress Reporting API
//!
//! This module provides a minimal API for the core library to report progress
//! without direct dependencies on CLI-specific formatting. The reporter is
//! passed into each run rather than stored globally; every method has a no-op
//! default so implementations only override what they display.

use crate::terminal_output::TERMINAL_TARGET;
use std::path::Path;
use std::time::Duration;

/// Represents different levels of output for structured reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    /// Major workflow phases (===== SECTION =====)
    Section,
    /// Processing steps (» Processing)
    Processing,
    /// Success messages (✓ Success)
    Success,
    /// Warning messages
    Warning,
    /// General information
    Info,
}

/// Receives progress from a run.
pub trait ProgressReporter {
    /// Output a message at a specific level
    fn output(&self, _level: OutputLevel, _text: &str) {}

    /// Output a key-value status pair
    fn output_status(&self, _label: &str, _value: &str, _highlight: bool) {}

    /// Called once before the first frame with the projected processing time.
    fn estimate(&self, _frame_count: Option<u64>, _estimate: Option<Duration>) {}

    /// Called after each frame is written; `frames_done` counts from one.
    fn frame_done(&self, _frames_done: u64, _total_frames: Option<u64>) {}

    /// Called once after the last frame, successful or not.
    fn finish_frames(&self) {}
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}

/// Reporter that writes progress to the log, one line per `every` frames.
/// Lines use the terminal output target, so they reach the console.
#[derive(Debug, Clone, Copy)]
pub struct LogProgressReporter {
    every: u64,
}

impl LogProgressReporter {
    #[must_use]
    pub fn new(every: u64) -> Self {
        Self { every: every.max(1) }
    }
}

impl Default for LogProgressReporter {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ProgressReporter for LogProgressReporter {
    fn output(&self, level: OutputLevel, text: &str) {
        match level {
            OutputLevel::Warning => log::warn!(target: TERMINAL_TARGET, "{}", text),
            _ => log::info!(target: TERMINAL_TARGET, "{}", text),
        }
    }

    fn output_status(&self, label: &str, value: &str, _highlight: bool) {
        log::info!(target: TERMINAL_TARGET, "{}: {}", label, value);
    }

    fn estimate(&self, frame_count: Option<u64>, estimate: Option<Duration>) {
        match (frame_count, estimate) {
            (Some(frames), Some(estimate)) => log::info!(target: TERMINAL_TARGET, 
                "{} frames, estimated processing time {}",
                frames,
                crate::utils::format_estimate(estimate)
            ),
            _ => log::info!(target: TERMINAL_TARGET, "Frame count unknown, no processing estimate available"),
        }
    }

    fn frame_done(&self, frames_done: u64, total_frames: Option<u64>) {
        if frames_done % self.every != 0 {
            return;
        }
        match total_frames {
            Some(total) if total > 0 => log::info!(target: TERMINAL_TARGET, 
                "Processed {}/{} frames ({:.1}%)",
                frames_done,
                total,
                frames_done as f64 / total as f64 * 100.0
            ),
            _ => log::info!(target: TERMINAL_TARGET, "Processed {} frames", frames_done),
        }
    }
}

/// Reports the start of a named step on `path`.
pub fn report_step(reporter: &dyn ProgressReporter, step: &str, path: &Path) {
    let filename = crate::utils::get_filename_safe(path).unwrap_or_else(|_| path.display().to_string());
    reporter.output(OutputLevel::Processing, &format!("{step}: {filename}"));
}
