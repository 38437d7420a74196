//! FFmpeg command builder utilities
//!
//! This module provides a small builder for constructing FFmpeg commands with
//! the options every FaceBlur invocation shares, plus a filter chain helper.

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::{Path, PathBuf};

/// Builder for creating `FFmpeg` commands with common configurations
pub struct FfmpegCommandBuilder {
    binary: PathBuf,
    overwrite: bool,
}

impl FfmpegCommandBuilder {
    /// Creates a builder for the binary at `binary`
    #[must_use]
    pub fn new(binary: &Path) -> Self {
        Self {
            binary: binary.to_path_buf(),
            overwrite: false,
        }
    }

    /// Sets whether existing output files are overwritten without asking
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Builds the `FFmpeg` command, banner hidden, with all configured options
    #[must_use]
    pub fn build(self) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path(&self.binary);
        cmd.hide_banner();
        if self.overwrite {
            cmd.overwrite();
        }
        cmd
    }
}

/// Builder for constructing video filter chains
#[derive(Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scale filter to the chain
    #[must_use]
    pub fn add_scale(mut self, width: u32, height: u32) -> Self {
        self.filters.push(format!("scale={width}:{height}"));
        self
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}
