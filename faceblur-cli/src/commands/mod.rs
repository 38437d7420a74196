//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// The `models` command: lists the known model profiles.
pub mod models;

/// The `run` command: blurs one video.
pub mod run;
