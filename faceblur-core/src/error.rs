// ============================================================================
// faceblur-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the FaceBlur Core Library
//
// This module defines the single error enum used across faceblur-core. Every
// failure in a run is a hard stop, so the variants carry enough context (the
// tool name, the path, the rejected value) to explain the stop to the user.
//
// KEY COMPONENTS:
// - CoreError: All failure modes of settings, media tools, detection and I/O
// - CoreResult: Result alias used by every fallible core operation
// - Helper constructors for external command failures
//
// AI-ASSISTANT-INFO: Error types and helpers for faceblur-core

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors produced by the FaceBlur core library.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- Media tool lifecycle ----
    #[error("Media tool not found or not executable: {0}")]
    ToolNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command '{0}' failed with status {1}. Stderr: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Expected output file was not produced: {}", .0.display())]
    OutputNotProduced(PathBuf),

    // ---- Settings ----
    #[error("Unsupported resolution '{0}' (expected 480p, 720p or 1080p)")]
    UnsupportedResolution(String),

    #[error("Unknown model identifier '{0}'")]
    UnknownModel(String),

    #[error("Invalid time value '{0}': {1}")]
    InvalidTime(String, String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to read settings file {}: {1}", .0.display())]
    SettingsFile(PathBuf, String),

    // ---- Pipeline ----
    #[error("Cannot read video source {}: {1}", .0.display())]
    UnreadableSource(PathBuf, String),

    #[error("Frame decode error: {0}")]
    FrameDecode(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Run cancelled before processing started")]
    Cancelled,

    #[error("Pipeline used out of order: {0}")]
    InvalidState(String),

    // ---- Audio ----
    #[error("Audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("Muxing audio with video failed: {0}")]
    MuxFailed(String),

    // ---- Miscellaneous ----
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),
}

/// Result type for faceblur-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a command that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a [`CoreError::CommandWait`] for a command whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a command that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

impl From<ort::Error> for CoreError {
    fn from(err: ort::Error) -> Self {
        CoreError::Detection(err.to_string())
    }
}

impl From<image::ImageError> for CoreError {
    fn from(err: image::ImageError) -> Self {
        CoreError::FrameDecode(err.to_string())
    }
}
