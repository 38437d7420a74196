//! Restoring the original audio track to the blurred video.
//!
//! The pipeline writes video only. When audio is kept, the first audio
//! stream of the pipeline's input is extracted to a temporary AAC file and
//! muxed with the blurred video, copying the video stream.

use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegCommandBuilder, FfmpegSpawner, MediaTool, run_to_completion};
use crate::temp_files::create_temp_file;
use crate::utils::{prefixed_sibling, remove_if_exists};
use std::path::{Path, PathBuf};

/// Prefix of the muxed output's file name.
pub const AUDIO_PREFIX: &str = "w_audio_";

/// Muxes the first audio stream of `audio_source` into `blurred`, writing
/// `w_audio_<blurred name>` next to the blurred video.
///
/// `has_audio` comes from probing `audio_source`; without an audio stream
/// this fails with `AudioExtractionFailed` before running anything. The
/// temporary audio file is removed on success and failure alike.
pub fn remux_audio<S: FfmpegSpawner>(
    spawner: &S,
    tool: &MediaTool,
    audio_source: &Path,
    has_audio: bool,
    blurred: &Path,
) -> CoreResult<PathBuf> {
    if !has_audio {
        return Err(CoreError::AudioExtractionFailed(format!(
            "{} has no audio stream",
            audio_source.display()
        )));
    }

    let output = prefixed_sibling(blurred, AUDIO_PREFIX)?;
    remove_if_exists(&output)?;

    let work_dir = blurred.parent().unwrap_or_else(|| Path::new("."));
    let extracted = create_temp_file(work_dir, "faceblur_audio", "aac")?;

    extract_audio(spawner, tool, audio_source, extracted.path())?;
    mux(spawner, tool, blurred, extracted.path(), &output)?;

    log::info!("Muxed audio into {}", output.display());
    Ok(output)
}

fn extract_audio<S: FfmpegSpawner>(spawner: &S, tool: &MediaTool, source: &Path, audio_out: &Path) -> CoreResult<()> {
    let mut cmd = FfmpegCommandBuilder::new(tool.path())
        .with_overwrite(true)
        .build();
    cmd.input(&*source.to_string_lossy())
        .args(["-vn", "-map", "0:a:0", "-q:a", "0"])
        .output(&*audio_out.to_string_lossy());

    let run = run_to_completion(spawner, cmd, "ffmpeg (extract audio)")?;
    if !run.status.success() {
        return Err(CoreError::AudioExtractionFailed(format!(
            "ffmpeg exited with {}: {}",
            run.status,
            run.stderr_summary()
        )));
    }
    Ok(())
}

fn mux<S: FfmpegSpawner>(spawner: &S, tool: &MediaTool, video: &Path, audio: &Path, output: &Path) -> CoreResult<()> {
    let mut cmd = FfmpegCommandBuilder::new(tool.path())
        .with_overwrite(true)
        .build();
    cmd.input(&*video.to_string_lossy())
        .input(&*audio.to_string_lossy())
        .args(["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", "aac"])
        .output(&*output.to_string_lossy());

    let run = run_to_completion(spawner, cmd, "ffmpeg (mux audio)")?;
    if !run.status.success() {
        return Err(CoreError::MuxFailed(format!(
            "ffmpeg exited with {}: {}",
            run.status,
            run.stderr_summary()
        )));
    }
    if !output.exists() {
        return Err(CoreError::OutputNotProduced(output.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockFfmpegSpawner;

    fn temp_audio_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("faceblur_audio_"))
            .count()
    }

    #[test]
    fn test_extract_then_mux_with_blurred_video() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        let blurred = dir.path().join("blurred_clip.mp4");

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("-vn", Vec::new(), true);
        spawner.add_success_expectation("1:a:0", Vec::new(), true);

        let tool = MediaTool::from_path_unchecked("ffmpeg");
        let output = remux_audio(&spawner, &tool, &source, true, &blurred).unwrap();
        assert_eq!(output, dir.path().join("w_audio_blurred_clip.mp4"));

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 2);

        let extract = &calls[0];
        let i = extract.iter().position(|a| a == "-i").unwrap();
        assert_eq!(extract[i + 1], source.to_string_lossy());
        assert_eq!(extract[i + 2..i + 7], ["-vn", "-map", "0:a:0", "-q:a", "0"][..]);
        assert!(extract.last().unwrap().ends_with(".aac"));

        let mux = &calls[1];
        let inputs: Vec<&String> = mux
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(n, _)| &mux[n + 1])
            .collect();
        assert_eq!(inputs.len(), 2);
        assert_eq!(*inputs[0], blurred.to_string_lossy());
        assert_eq!(inputs[1], extract.last().unwrap());
        assert!(mux.ends_with(&[
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            output.to_string_lossy().into_owned(),
        ]));

        assert_eq!(temp_audio_files(dir.path()), 0);
    }

    #[test]
    fn test_no_audio_stream() {
        let spawner = MockFfmpegSpawner::new();
        let tool = MediaTool::from_path_unchecked("ffmpeg");
        let result = remux_audio(
            &spawner,
            &tool,
            Path::new("/v/clip.mp4"),
            false,
            Path::new("/v/blurred_clip.mp4"),
        );
        assert!(matches!(result, Err(CoreError::AudioExtractionFailed(_))));
        assert!(spawner.get_received_calls().is_empty());
    }

    #[test]
    fn test_failures_map_to_step_errors() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("clip.mp4");
        let blurred = dir.path().join("blurred_clip.mp4");
        let tool = MediaTool::from_path_unchecked("ffmpeg");

        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("-vn", Vec::new(), 1 << 8);
        assert!(matches!(
            remux_audio(&spawner, &tool, &source, true, &blurred),
            Err(CoreError::AudioExtractionFailed(_))
        ));
        assert_eq!(temp_audio_files(dir.path()), 0);

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("-vn", Vec::new(), true);
        spawner.add_exit_error_expectation("1:a:0", Vec::new(), 1 << 8);
        assert!(matches!(
            remux_audio(&spawner, &tool, &source, true, &blurred),
            Err(CoreError::MuxFailed(_))
        ));
        assert_eq!(temp_audio_files(dir.path()), 0);
    }
}
