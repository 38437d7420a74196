// ============================================================================
// faceblur-cli/src/cli.rs
// ============================================================================
//
// COMMAND LINE INTERFACE: Argument Definitions
//
// This module defines the command-line argument structures using clap's
// derive API. Every run flag is optional and overrides the matching key of
// the settings file, so a run can be driven by the file, by flags, or both.
//
// KEY COMPONENTS:
// - Cli: Top-level argument structure
// - Commands: Available subcommands (run, models)
// - RunArgs: Arguments for the run command
//
// AI-ASSISTANT-INFO: Command-line argument definitions using clap

// ---- External crate imports ----
use clap::{Args, Parser, Subcommand};

// ---- Standard library imports ----
use std::path::PathBuf;

// ============================================================================
// MAIN CLI STRUCTURE
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "FaceBlur: blur faces and heads in video",
    long_about = "Detects faces or heads in every frame of a video with a YOLO model \
                  and blurs them, optionally cutting, resizing and keeping the audio."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Blur faces or heads in a video
    Run(RunArgs),

    /// List the supported model identifiers
    Models,
}

// ============================================================================
// RUN COMMAND ARGUMENTS
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Settings file (TOML) providing defaults for every option below
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Source video
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    // ---- Cut ----
    /// Cut start, in the settings file's time format (mm:ss by default)
    #[arg(long, value_name = "TIME", requires = "duration", conflicts_with = "no_cut")]
    pub start: Option<String>,

    /// Cut length, in the same format as --start
    #[arg(long, value_name = "TIME", requires = "start", conflicts_with = "no_cut")]
    pub duration: Option<String>,

    /// Process the whole source even if the settings file requests a cut
    #[arg(long)]
    pub no_cut: bool,

    // ---- Output ----
    /// Restore the source audio track in a second output file
    #[arg(long)]
    pub keep_audio: bool,

    /// Resize before processing (480p, 720p or 1080p)
    #[arg(short = 'r', long, value_name = "RES", conflicts_with = "no_resize")]
    pub resolution: Option<String>,

    /// Keep the source resolution even if the settings file requests a resize
    #[arg(long)]
    pub no_resize: bool,

    // ---- Detection ----
    /// Minimum detection confidence (0.0 to 1.0)
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub threshold: Option<f32>,

    /// Model identifier (see `faceblur models`)
    #[arg(short = 'm', long, value_name = "ID")]
    pub model: Option<String>,

    /// Directory containing the exported ONNX weights
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    // ---- Interaction ----
    /// Start without asking for confirmation after the estimate
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Ring the terminal bell when the run ends
    #[arg(long)]
    pub bell: bool,

    /// ntfy topic URL for completion notifications (e.g., https://ntfy.sh/your_topic)
    #[arg(long, value_name = "TOPIC_URL", env = "FACEBLUR_NTFY_TOPIC")]
    pub ntfy: Option<String>,

    // ---- Logging ----
    /// Also write the log to faceblur_<timestamp>.log in this directory
    #[arg(short = 'l', long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
