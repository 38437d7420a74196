//! Simple terminal output functions for faceblur-core.
//!
//! This module provides basic terminal formatting functions that keep the
//! hierarchical output structure (sections, steps, status lines) consistent
//! between the CLI and the library's own reporting. Everything goes through
//! the `log` facade under [`TERMINAL_TARGET`], so the same lines also land in
//! the log file while the console shows them without the surrounding debug
//! and info chatter.

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Log target of every line written by this module.
pub const TERMINAL_TARGET: &str = "faceblur::terminal";

/// Check if color should be used (respects NO_COLOR environment variable)
fn should_use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a section header (Level 1 - Main sections with cyan color)
pub fn print_section(title: &str) {
    info!(target: TERMINAL_TARGET, "");
    if should_use_color() {
        info!(target: TERMINAL_TARGET, "===== {} =====", title.to_uppercase().cyan().bold());
    } else {
        info!(target: TERMINAL_TARGET, "===== {} =====", title.to_uppercase());
    }
    info!(target: TERMINAL_TARGET, "");
}

/// Print a processing step (Level 2 - 2 spaces indentation and bold)
pub fn print_processing(message: &str) {
    info!(target: TERMINAL_TARGET, "");
    if should_use_color() {
        info!(target: TERMINAL_TARGET, "  {} {}", "»", style(message).bold());
    } else {
        info!(target: TERMINAL_TARGET, "  » {}", message);
    }
}

/// Print a status line (Level 4 - 6 spaces indentation, aligned values)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label_width: usize = 15;
    let padding = label_width.saturating_sub(label.len()).max(1);

    if should_use_color() && highlight {
        info!(target: TERMINAL_TARGET, "      {}:{} {}", label, " ".repeat(padding), style(value).bold());
    } else {
        info!(target: TERMINAL_TARGET, "      {}:{} {}", label, " ".repeat(padding), value);
    }
}

/// Print a success message (Level 2 - green)
pub fn print_success(message: &str) {
    info!(target: TERMINAL_TARGET, "");
    if should_use_color() {
        info!(target: TERMINAL_TARGET, "  ✓ {}", message.green());
    } else {
        info!(target: TERMINAL_TARGET, "  ✓ {}", message);
    }
}

/// Print a warning (Level 2 - yellow)
pub fn print_warning(message: &str) {
    if should_use_color() {
        log::warn!(target: TERMINAL_TARGET, "  ! {}", message.yellow());
    } else {
        log::warn!(target: TERMINAL_TARGET, "  ! {}", message);
    }
}

/// Print a sub-item (Level 3 - 4 spaces indentation)
pub fn print_sub_item(message: &str) {
    info!(target: TERMINAL_TARGET, "    {}", message);
}

/// Builds the per-frame progress bar. With an unknown total the bar shows a
/// spinner and a running count instead.
#[must_use]
pub fn frame_progress_bar(total_frames: Option<u64>) -> ProgressBar {
    let pb = match total_frames {
        Some(total) => {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("Blurring: {percent:>3}% [{bar:30}] {pos}/{len} frames ({elapsed_precise} / {eta_precise})")
            {
                pb.set_style(style.progress_chars("##."));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("Blurring: {spinner} {pos} frames ({elapsed_precise})") {
                pb.set_style(style);
            }
            pb
        }
    };

    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_length() {
        let pb = frame_progress_bar(Some(42));
        assert_eq!(pb.length(), Some(42));
        pb.inc(2);
        assert_eq!(pb.position(), 2);
        pb.finish_and_clear();

        let spinner = frame_progress_bar(None);
        assert_eq!(spinner.length(), None);
    }
}
