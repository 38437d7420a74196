//! Implementation of the 'run' subcommand.
//!
//! Resolves settings from the optional settings file plus command-line
//! overrides, loads the detector, wires up confirmation, progress and
//! notifications, and hands off to `faceblur_core::process_video`.

use crate::cli::RunArgs;
use crate::error::CliResult;
use crate::progress::TerminalProgressReporter;

use faceblur_core::external::SidecarSpawner;
use faceblur_core::notifications::{
    CompositeNotificationSender, NotificationType, NtfyNotificationSender, TerminalBellNotifier,
    send_best_effort,
};
use faceblur_core::terminal_output;
use faceblur_core::{
    OnnxYoloDetector, ProcessingEstimate, RunHooks, RunResult, Settings, SettingsBuilder,
    SettingsFile, format_duration, process_video,
};

use console::Term;
use log::{debug, info, warn};

/// Builds validated settings: file values first, then flag overrides.
pub fn resolve_settings(args: &RunArgs) -> CliResult<Settings> {
    let mut builder = match &args.config {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            SettingsFile::load(path)?.into_builder()?
        }
        None => SettingsBuilder::new(),
    };

    if let Some(input) = &args.input {
        builder = builder.input_path(input.clone());
    }
    if let Some(ffmpeg) = &args.ffmpeg {
        builder = builder.ffmpeg_path(ffmpeg.clone());
    }

    if args.no_cut {
        builder = builder.no_cut();
    } else if let (Some(start), Some(duration)) = (&args.start, &args.duration) {
        builder = builder.cut(start.clone(), duration.clone());
    }

    if args.keep_audio {
        builder = builder.keep_audio(true);
    }

    if args.no_resize {
        builder = builder.no_resize();
    } else if let Some(resolution) = &args.resolution {
        builder = builder.resolution(resolution.clone());
    }

    if let Some(threshold) = args.threshold {
        builder = builder.confidence_threshold(threshold);
    }
    if let Some(model) = &args.model {
        builder = builder.model(model.clone());
    }
    if let Some(dir) = &args.model_dir {
        builder = builder.model_dir(dir.clone());
    }

    builder.build()
}

/// Notification targets requested on the command line.
///
/// An unusable ntfy URL is reported and skipped, since notifications never
/// decide the outcome of a run.
pub fn build_notifier(args: &RunArgs) -> CompositeNotificationSender {
    let mut notifier = CompositeNotificationSender::new();
    if args.bell {
        notifier.push(Box::new(TerminalBellNotifier::new()));
    }
    if let Some(url) = &args.ntfy {
        match NtfyNotificationSender::new(url) {
            Ok(sender) => {
                info!("Sending notifications to ntfy topic '{}'", sender.topic());
                notifier.push(Box::new(sender));
            }
            Err(e) => warn!("Notifications disabled: {}", e),
        }
    }
    notifier
}

/// Whether an answer to the confirmation prompt means "go ahead".
/// An empty answer accepts the default.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}

/// Asks on the terminal whether to start processing.
fn confirm_on_terminal(estimate: &ProcessingEstimate) -> bool {
    let term = Term::stderr();
    if !term.is_term() {
        info!("Not attached to a terminal, starting without confirmation");
        return true;
    }

    let prompt = match estimate.frame_count {
        Some(frames) => format!("Blur {frames} frames? [Y/n] "),
        None => "Start blurring? [Y/n] ".to_string(),
    };
    if let Err(e) = term.write_str(&prompt) {
        warn!("Could not show the confirmation prompt: {}", e);
        return true;
    }
    match term.read_line() {
        Ok(answer) => is_affirmative(&answer),
        Err(e) => {
            warn!("Could not read the confirmation answer: {}", e);
            false
        }
    }
}

/// Runs the `run` command end to end.
pub fn run_blur(args: RunArgs) -> CliResult<RunResult> {
    let settings = resolve_settings(&args)?;
    let notifier = build_notifier(&args);

    terminal_output::print_section("FaceBlur");
    terminal_output::print_status("Input", &settings.input_path.display().to_string(), false);
    terminal_output::print_status("Model", settings.model.identifier(), false);
    terminal_output::print_status("Blur style", &settings.model.blur_style().to_string(), false);
    terminal_output::print_status(
        "Confidence threshold",
        &format!("{:.2}", settings.confidence_threshold),
        false,
    );
    if let Some(cut) = &settings.cut {
        terminal_output::print_status(
            "Cut",
            &format!("{}s for {}s", cut.start_secs, cut.duration_secs),
            false,
        );
    }
    if let Some(resolution) = settings.resize {
        terminal_output::print_status("Resize", &resolution.to_string(), false);
    }

    let weights = settings.model_weights_path();
    let detector = match OnnxYoloDetector::load(&weights, settings.model.target_class()) {
        Ok(detector) => detector,
        Err(e) => {
            send_best_effort(
                &notifier,
                &NotificationType::RunError {
                    input_path: settings.input_path.clone(),
                    message: e.to_string(),
                },
            );
            return Err(e);
        }
    };

    let skip_prompt = args.yes;
    let mut confirm = |estimate: &ProcessingEstimate| skip_prompt || confirm_on_terminal(estimate);
    let progress = TerminalProgressReporter::new();

    let result = process_video(
        &settings,
        &SidecarSpawner,
        detector,
        RunHooks {
            progress: &progress,
            confirm: &mut confirm,
            notifier: &notifier,
        },
    )?;

    terminal_output::print_section("Summary");
    terminal_output::print_status("Frames", &result.frame_count.to_string(), false);
    terminal_output::print_status("Total time", &format_duration(result.elapsed.as_secs_f64()), false);
    terminal_output::print_status("Blurred video", &result.output_path.display().to_string(), false);
    if let Some(with_audio) = &result.output_with_audio {
        terminal_output::print_status("With audio", &with_audio.display().to_string(), false);
    }
    terminal_output::print_success(&format!("Done: {}", result.final_output().display()));

    Ok(result)
}
