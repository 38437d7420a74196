// ============================================================================
// faceblur-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal progress for a run
//
// Implements the core ProgressReporter for the terminal: sections and status
// lines go through faceblur_core::terminal_output, and per-frame progress
// drives an indicatif bar created when the first frame completes.
//
// KEY COMPONENTS:
// - TerminalProgressReporter: Styled output plus a frame progress bar
//
// AI-ASSISTANT-INFO: CLI-specific progress reporting

// ---- External crate imports ----
use faceblur_core::progress_reporting::{OutputLevel, ProgressReporter};
use faceblur_core::terminal_output;
use faceblur_core::utils::format_estimate;
use indicatif::ProgressBar;

// ---- Standard library imports ----
use std::cell::OnceCell;
use std::time::Duration;

/// Progress reporter that writes to the terminal.
#[derive(Default)]
pub struct TerminalProgressReporter {
    bar: OnceCell<ProgressBar>,
}

impl TerminalProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for TerminalProgressReporter {
    fn output(&self, level: OutputLevel, text: &str) {
        match level {
            OutputLevel::Section => terminal_output::print_section(text),
            OutputLevel::Processing => terminal_output::print_processing(text),
            OutputLevel::Success => terminal_output::print_success(text),
            OutputLevel::Warning => terminal_output::print_warning(text),
            OutputLevel::Info => terminal_output::print_sub_item(text),
        }
    }

    fn output_status(&self, label: &str, value: &str, highlight: bool) {
        terminal_output::print_status(label, value, highlight);
    }

    fn estimate(&self, _frame_count: Option<u64>, estimate: Option<Duration>) {
        match estimate {
            Some(duration) => terminal_output::print_status("Estimated time", &format_estimate(duration), true),
            None => terminal_output::print_status("Estimated time", "unknown (frame count unavailable)", false),
        }
    }

    fn frame_done(&self, frames_done: u64, total_frames: Option<u64>) {
        let bar = self.bar.get_or_init(|| terminal_output::frame_progress_bar(total_frames));
        bar.set_position(frames_done);
    }

    fn finish_frames(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}
