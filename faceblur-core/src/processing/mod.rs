// ============================================================================
// faceblur-core/src/processing/mod.rs
// ============================================================================
//
// PROCESSING: Run Orchestration for One Video
//
// This module chains the steps of a run: locate the media tool, optionally
// cut and resize the source, stream it through the frame pipeline, and
// optionally restore the audio. Each step feeds its output file to the next.
// Every failure is a hard stop; the notifier hears about the outcome either
// way.
//
// KEY COMPONENTS:
// - process_video: The run entry point
// - RunHooks: Progress, confirmation and notification callbacks
// - RunResult: Output paths, elapsed time and frame count
// - cut_time_range / resize_video / remux_audio: The media-tool steps
//
// AI-ASSISTANT-INFO: Run orchestration and media-tool processing steps

// ---- Internal crate imports ----
use crate::config::Settings;
use crate::detection::Detector;
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::{FfmpegSpawner, MediaTool, run_to_completion};
use crate::notifications::{NotificationSender, NotificationType, send_best_effort};
use crate::pipeline::{FrameProcessingPipeline, ProcessingEstimate, SidecarFrameSink, SidecarFrameSource};
use crate::progress_reporting::{OutputLevel, ProgressReporter, report_step};
use crate::utils::{format_bytes, get_filename_safe, prefixed_sibling};

// ---- External crate imports ----
use ffmpeg_sidecar::command::FfmpegCommand;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Restoring the original audio to the blurred video
pub mod audio;

/// Trimming to a time range
pub mod cutter;

/// Rescaling to a preset resolution
pub mod resizer;

pub use audio::remux_audio;
pub use cutter::cut_time_range;
pub use resizer::resize_video;

/// Prefix of the pipeline output's file name.
pub const BLURRED_PREFIX: &str = "blurred_";

// ============================================================================
// RUN TYPES
// ============================================================================

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Blurred video, without audio.
    pub output_path: PathBuf,
    /// Blurred video with the original audio, when audio was kept.
    pub output_with_audio: Option<PathBuf>,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
    pub frame_count: u64,
}

impl RunResult {
    /// The file a user wants: the audio remux when there is one.
    #[must_use]
    pub fn final_output(&self) -> &Path {
        self.output_with_audio.as_deref().unwrap_or(&self.output_path)
    }
}

/// Callbacks a caller plugs into a run.
pub struct RunHooks<'a> {
    pub progress: &'a dyn ProgressReporter,
    /// Asked once with the processing estimate; `false` cancels the run.
    pub confirm: &'a mut dyn FnMut(&ProcessingEstimate) -> bool,
    pub notifier: &'a dyn NotificationSender,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Runs the whole redaction for `settings`.
///
/// Cut, resize and audio commands go through `spawner`; the frame pipeline
/// streams through its own decoder and encoder processes. A completion or
/// error notification is sent (best effort) before returning; a run declined
/// at the confirmation prompt sends none.
pub fn process_video<S, D>(settings: &Settings, spawner: &S, detector: D, hooks: RunHooks<'_>) -> CoreResult<RunResult>
where
    S: FfmpegSpawner,
    D: Detector,
{
    let RunHooks {
        progress,
        confirm,
        notifier,
    } = hooks;

    let started = Instant::now();
    let result = run_steps(settings, spawner, detector, progress, confirm, started);

    if matches!(result, Err(CoreError::Cancelled)) {
        log::info!("Run cancelled for {}", settings.input_path.display());
        return result;
    }

    let notification = match &result {
        Ok(run) => NotificationType::RunComplete {
            input_path: settings.input_path.clone(),
            output_path: run.final_output().to_path_buf(),
            frame_count: run.frame_count,
            duration: run.elapsed,
        },
        Err(e) => {
            log::error!("Run failed for {}: {}", settings.input_path.display(), e);
            NotificationType::RunError {
                input_path: settings.input_path.clone(),
                message: e.to_string(),
            }
        }
    };
    send_best_effort(notifier, &notification);
    result
}

fn run_steps<S: FfmpegSpawner, D: Detector>(
    settings: &Settings,
    spawner: &S,
    detector: D,
    progress: &dyn ProgressReporter,
    confirm: &mut dyn FnMut(&ProcessingEstimate) -> bool,
    started: Instant,
) -> CoreResult<RunResult> {
    let tool = MediaTool::locate(&settings.ffmpeg_path)?;

    progress.output(OutputLevel::Section, "Preparing");
    let mut current = settings.input_path.clone();
    if let Some(range) = &settings.cut {
        report_step(progress, "Cutting", &current);
        current = cut_time_range(spawner, &tool, &current, range)?;
        progress.output_status("Cut video", &get_filename_safe(&current)?, false);
    }
    if let Some(resolution) = settings.resize {
        report_step(progress, "Resizing", &current);
        current = resize_video(spawner, &tool, &current, resolution)?;
        progress.output_status("Resized video", &get_filename_safe(&current)?, false);
    }

    progress.output(OutputLevel::Section, "Blurring");
    let blurred = prefixed_sibling(&current, BLURRED_PREFIX)?;
    let mut pipeline = FrameProcessingPipeline::new(detector, settings.model, settings.confidence_threshold);
    let info = pipeline.open(|| SidecarFrameSource::open(&tool, &current))?;

    if let Ok(metadata) = std::fs::metadata(&current) {
        progress.output_status("File size", &format_bytes(metadata.len()), false);
    }
    progress.output_status("Resolution", &format!("{}x{}", info.width, info.height), false);
    progress.output_status("Frame rate", &format!("{:.3} fps", info.fps), false);
    progress.output_status(
        "Total frames",
        &info.frame_count.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
        false,
    );
    progress.output_status("Model", settings.model.identifier(), false);

    pipeline.begin(progress, |estimate| confirm(estimate))?;

    let mut sink = SidecarFrameSink::new(&tool, &blurred, info.fps);
    let summary = pipeline.run(&mut sink, progress)?;
    progress.output_status("Blurred video", &get_filename_safe(&blurred)?, true);

    let output_with_audio = if settings.keep_audio {
        progress.output(OutputLevel::Section, "Audio");
        report_step(progress, "Restoring audio", &blurred);
        let muxed = remux_audio(spawner, &tool, &current, info.has_audio, &blurred)?;
        progress.output_status("With audio", &get_filename_safe(&muxed)?, true);
        Some(muxed)
    } else {
        None
    };

    Ok(RunResult {
        output_path: blurred,
        output_with_audio,
        elapsed: started.elapsed(),
        frame_count: summary.frames_processed,
    })
}

// ============================================================================
// SHARED STEP HELPER
// ============================================================================

/// Runs a single-output tool step: a failed exit is `CommandFailed`, a
/// missing output afterwards is `OutputNotProduced`.
pub(crate) fn run_tool_step<S: FfmpegSpawner>(spawner: &S, cmd: FfmpegCommand, label: &str, output: &Path) -> CoreResult<()> {
    let run = run_to_completion(spawner, cmd, label)?;
    if !run.status.success() {
        return Err(command_failed_error(label, run.status, run.stderr_summary()));
    }
    if !output.exists() {
        log::error!("{} exited successfully but {} is missing", label, output.display());
        return Err(CoreError::OutputNotProduced(output.to_path_buf()));
    }
    log::debug!("{} wrote {}", label, output.display());
    Ok(())
}
