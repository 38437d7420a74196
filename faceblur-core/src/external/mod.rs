// ============================================================================
// faceblur-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg and ffprobe Command-Line Tools
//
// This module encapsulates every interaction with the media command-line
// tool. Commands are built here, spawned through the FfmpegSpawner trait so
// tests can substitute a mock, and probed with the ffprobe binary that sits
// beside it.
//
// KEY COMPONENTS:
// - MediaTool: A located, executable ffmpeg binary
// - FfmpegSpawner / FfmpegProcess: Traits for running ffmpeg commands
// - FfmpegCommandBuilder / VideoFilterChain: Argument construction helpers
// - probe / StreamInfo: Stream properties read through ffprobe
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- External crate imports ----
use ffmpeg_sidecar::command::FfmpegCommand;

// ---- Standard library imports ----
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Builders for ffmpeg arguments and filter chains
pub mod ffmpeg_builder;

/// Traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Stream probing through ffprobe
pub mod ffprobe_executor;

/// Mock spawner for tests
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{FfmpegCommandBuilder, VideoFilterChain};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_to_completion};
pub use ffprobe_executor::{StreamInfo, probe};

// ============================================================================
// MEDIA TOOL
// ============================================================================

/// A media command-line tool (ffmpeg) known to be executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTool {
    path: PathBuf,
}

impl MediaTool {
    /// Locates the tool by running `<path> -version`.
    ///
    /// A missing or non-executable binary fails with `ToolNotFound`; any
    /// other spawn failure is reported as `CommandStart`.
    pub fn locate(path: &Path) -> CoreResult<Self> {
        let result = Command::new(path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(_) => {
                log::debug!("Found media tool: {}", path.display());
                Ok(Self {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied) => {
                log::warn!("Media tool '{}' not found: {}", path.display(), e);
                Err(CoreError::ToolNotFound(path.display().to_string()))
            }
            Err(e) => {
                log::error!("Failed to start media tool check '{}': {}", path.display(), e);
                Err(CoreError::CommandStart(path.display().to_string(), e))
            }
        }
    }

    /// Wraps a path without running the version check.
    #[must_use]
    pub fn from_path_unchecked(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The ffprobe shipped beside this ffmpeg: same directory, with
    /// `ffmpeg` replaced by `ffprobe` in the file name. A tool whose name
    /// does not mention ffmpeg falls back to `ffprobe` on `PATH`.
    #[must_use]
    pub fn ffprobe_path(&self) -> PathBuf {
        let sibling = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().replace("ffmpeg", "ffprobe"))
            .filter(|name| name.contains("ffprobe"));
        match sibling {
            Some(name) => self.path.with_file_name(name),
            None => PathBuf::from("ffprobe"),
        }
    }

    /// Starts a new command for this tool with the usual defaults.
    #[must_use]
    pub fn command(&self) -> FfmpegCommand {
        FfmpegCommandBuilder::new(&self.path).build()
    }
}
