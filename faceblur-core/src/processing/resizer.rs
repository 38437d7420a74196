//! Rescaling a video to a preset resolution.

use super::run_tool_step;
use crate::config::Resolution;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, MediaTool, VideoFilterChain};
use crate::utils::{prefixed_sibling, remove_if_exists};
use std::path::{Path, PathBuf};

/// Resizes `input` to `resolution`, writing `resized_<res>_<name>` next to it.
///
/// Audio is copied unchanged. Same overwrite and output checks as the cutter.
pub fn resize_video<S: FfmpegSpawner>(
    spawner: &S,
    tool: &MediaTool,
    input: &Path,
    resolution: Resolution,
) -> CoreResult<PathBuf> {
    let output = prefixed_sibling(input, &format!("resized_{}_", resolution.label()))?;
    remove_if_exists(&output)?;

    let (width, height) = resolution.dimensions();
    let filter = VideoFilterChain::new()
        .add_scale(width, height)
        .build()
        .ok_or_else(|| CoreError::InvalidSettings("empty scale filter".to_string()))?;

    let mut cmd = FfmpegCommandBuilder::new(tool.path())
        .with_overwrite(true)
        .build();
    cmd.input(&*input.to_string_lossy())
        .args(["-vf", filter.as_str(), "-c:a", "copy"])
        .output(&*output.to_string_lossy());

    log::info!("Resizing {} to {} ({}x{})", input.display(), resolution, width, height);
    run_tool_step(spawner, cmd, "ffmpeg (resize)", &output)?;
    Ok(output)
}
