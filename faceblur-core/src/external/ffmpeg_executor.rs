// ============================================================================
// faceblur-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes. The cutter, resizer and audio remuxer all run ffmpeg to
// completion through these traits, which lets tests inspect the exact
// arguments and simulate failures.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - run_to_completion: Spawn, drain events, check exit status
//
// AI-ASSISTANT-INFO: FFmpeg process management and execution abstraction

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_failed_error(
                "ffmpeg (sidecar - get iter)",
                ExitStatus::default(),
                e.to_string(),
            )
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

// --- Run-to-completion helper ---

/// Result of a finished ffmpeg invocation.
#[derive(Debug)]
pub struct CompletedRun {
    pub status: ExitStatus,
    /// Error lines ffmpeg printed, newest last.
    pub errors: Vec<String>,
}

impl CompletedRun {
    /// Error lines joined for inclusion in an error message.
    #[must_use]
    pub fn stderr_summary(&self) -> String {
        self.errors.join("\n")
    }
}

/// Spawns `cmd`, drains its events into the log and waits for it to exit.
///
/// The exit status is returned rather than checked, because each caller maps
/// a failed run to its own error.
pub fn run_to_completion<S: FfmpegSpawner>(spawner: &S, cmd: FfmpegCommand, label: &str) -> CoreResult<CompletedRun> {
    let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
    log::debug!("Running {}: ffmpeg {}", label, args.join(" "));

    let mut process = spawner.spawn(cmd)?;
    let mut errors = Vec::new();
    process.handle_events(|event| {
        match event {
            FfmpegEvent::Error(line) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                log::debug!("{}: {}", label, line);
                errors.push(line);
            }
            FfmpegEvent::Log(_, line) => log::trace!("{}: {}", label, line),
            _ => {}
        }
        Ok(())
    })?;
    let status = process.wait()?;

    if !status.success() {
        log::error!("{} exited with {}", label, status);
    }
    Ok(CompletedRun { status, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockFfmpegSpawner;
    use ffmpeg_sidecar::event::LogLevel;

    fn command_with(arg: &str) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new_with_path("ffmpeg");
        cmd.arg(arg);
        cmd
    }

    #[test]
    fn test_collects_error_lines() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation(
            "marker-a",
            vec![
                FfmpegEvent::Log(LogLevel::Info, "Input #0".to_string()),
                FfmpegEvent::Error("No such file".to_string()),
                FfmpegEvent::Log(LogLevel::Fatal, "Conversion failed!".to_string()),
            ],
            1 << 8,
        );

        let run = run_to_completion(&spawner, command_with("marker-a"), "test").unwrap();
        assert!(!run.status.success());
        assert_eq!(run.errors, vec!["No such file", "Conversion failed!"]);
        assert_eq!(run.stderr_summary(), "No such file\nConversion failed!");
    }

    #[test]
    fn test_spawn_error_propagates() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_spawn_error_expectation(
            "marker-b",
            command_start_error("ffmpeg", std::io::Error::other("cannot fork")),
        );
        assert!(run_to_completion(&spawner, command_with("marker-b"), "test").is_err());
    }
}
