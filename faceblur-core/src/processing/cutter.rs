//! Trimming a source video to a time range.
//!
//! The cut copies both streams (no re-encode), so it is fast but snaps to
//! keyframes the way ffmpeg's input seeking does.

use super::run_tool_step;
use crate::config::CutRange;
use crate::error::CoreResult;
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, MediaTool};
use crate::utils::{prefixed_sibling, remove_if_exists};
use std::path::{Path, PathBuf};

/// Prefix of the cut output's file name.
pub const CUT_PREFIX: &str = "cut_";

/// Cuts `input` to `range`, writing `cut_<name>` next to it.
///
/// Any existing file at the output path is deleted first. A failed run is
/// `CommandFailed`; a successful run with no output file is
/// `OutputNotProduced`.
pub fn cut_time_range<S: FfmpegSpawner>(
    spawner: &S,
    tool: &MediaTool,
    input: &Path,
    range: &CutRange,
) -> CoreResult<PathBuf> {
    let output = prefixed_sibling(input, CUT_PREFIX)?;
    remove_if_exists(&output)?;

    let start = range.start_secs.to_string();
    let duration = range.duration_secs.to_string();

    let mut cmd = FfmpegCommandBuilder::new(tool.path())
        .with_overwrite(true)
        .build();
    cmd.args(["-ss", start.as_str()])
        .input(&*input.to_string_lossy())
        .args(["-t", duration.as_str(), "-c:v", "copy", "-c:a", "copy"])
        .output(&*output.to_string_lossy());

    log::info!(
        "Cutting {} from {}s for {}s",
        input.display(),
        range.start_secs,
        range.duration_secs
    );
    run_tool_step(spawner, cmd, "ffmpeg (cut)", &output)?;
    Ok(output)
}
