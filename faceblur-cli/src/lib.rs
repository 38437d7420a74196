// faceblur-cli/src/lib.rs
//
// Library portion of the FaceBlur CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, RunArgs};
pub use commands::models::run_models;
pub use commands::run::run_blur;
