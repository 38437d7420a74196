//! FFprobe integration for stream properties
//!
//! This module reads the properties the pipeline needs before decoding a
//! video: frame size, frame rate, frame count and whether an audio stream is
//! present. Any failure to probe means the source cannot be processed and is
//! reported as `UnreadableSource`.
use crate::error::{CoreError, CoreResult};
use ffprobe::FfProbe;
use std::path::Path;
use std::process::{Command, Stdio};

/// Properties of the first video stream of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    /// Frames per second.
    pub fps: f64,
    /// Total frames, when the container records it or it can be derived.
    pub frame_count: Option<u64>,
    pub duration_secs: Option<f64>,
    pub has_audio: bool,
}

/// Runs `ffprobe_bin` on `input_path` and parses its JSON report.
fn run_ffprobe(ffprobe_bin: &Path, input_path: &Path) -> Result<FfProbe, String> {
    let output = Command::new(ffprobe_bin)
        .args(["-v", "quiet", "-show_format", "-show_streams", "-print_format", "json"])
        .arg(input_path)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| format!("could not run {}: {e}", ffprobe_bin.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("ffprobe exited with {}: {}", output.status, stderr.trim()));
    }

    serde_json::from_slice(&output.stdout).map_err(|e| format!("could not parse ffprobe output: {e}"))
}

/// Probes `input_path` with the ffprobe binary at `ffprobe_bin`.
pub fn probe(ffprobe_bin: &Path, input_path: &Path) -> CoreResult<StreamInfo> {
    log::debug!(
        "Running {} for stream info on: {}",
        ffprobe_bin.display(),
        input_path.display()
    );
    let unreadable = |msg: String| CoreError::UnreadableSource(input_path.to_path_buf(), msg);

    let metadata = run_ffprobe(ffprobe_bin, input_path).map_err(|msg| {
        log::error!("ffprobe failed on {}: {}", input_path.display(), msg);
        unreadable(msg)
    })?;

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| unreadable("no video stream found".to_string()))?;

    let width = video_stream
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| unreadable("video stream has no valid width".to_string()))?;
    let height = video_stream
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| unreadable("video stream has no valid height".to_string()))?;

    let fps = parse_frame_rate(&video_stream.avg_frame_rate)
        .filter(|r| *r > 0.0)
        .or_else(|| parse_frame_rate(&video_stream.r_frame_rate).filter(|r| *r > 0.0))
        .ok_or_else(|| unreadable("video stream has no usable frame rate".to_string()))?;

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| *d > 0.0);

    let frame_count = video_stream
        .nb_frames
        .as_deref()
        .and_then(|f| f.parse::<u64>().ok())
        .filter(|f| *f > 0)
        .or_else(|| duration_secs.map(|d| (d * fps).round() as u64));

    let has_audio = metadata
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(StreamInfo {
        width: width as u32,
        height: height as u32,
        fps,
        frame_count,
        duration_secs,
        has_audio,
    })
}

/// Parses a frame rate string such as `"30000/1001"` or `"25"`.
fn parse_frame_rate(frame_rate: &str) -> Option<f64> {
    match frame_rate.split_once('/') {
        Some((num, den)) => {
            let numerator: f64 = num.trim().parse().ok()?;
            let denominator: f64 = den.trim().parse().ok()?;
            (denominator != 0.0).then(|| numerator / denominator)
        }
        None => frame_rate.trim().parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_parsing() {
        assert_eq!(parse_frame_rate("30"), Some(30.0));
        assert_eq!(parse_frame_rate("29.97"), Some(29.97));
        assert_eq!(parse_frame_rate("30000/1001"), Some(30000.0 / 1001.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_missing_probe_tool_is_unreadable() {
        let result = probe(Path::new("/no/such/ffprobe"), Path::new("/no/such/video.mp4"));
        match result {
            Err(CoreError::UnreadableSource(path, msg)) => {
                assert_eq!(path, Path::new("/no/such/video.mp4"));
                assert!(msg.contains("/no/such/ffprobe"));
            }
            other => panic!("expected UnreadableSource, got {other:?}"),
        }
    }

    #[cfg(unix)]
    mod with_fake_tool {
        use super::*;
        use crate::external::MediaTool;
        use ffprobe::{Format, Stream};
        use std::os::unix::fs::PermissionsExt;

        /// Writes an executable script named `name` into `dir`.
        fn script(dir: &Path, name: &str, body: &str) {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        fn report() -> FfProbe {
            let video = Stream {
                index: 0,
                codec_type: Some("video".to_string()),
                width: Some(1280),
                height: Some(720),
                avg_frame_rate: "30000/1001".to_string(),
                r_frame_rate: "30000/1001".to_string(),
                nb_frames: Some("300".to_string()),
                ..Stream::default()
            };
            let audio = Stream {
                index: 1,
                codec_type: Some("audio".to_string()),
                ..Stream::default()
            };
            FfProbe {
                streams: vec![video, audio],
                format: Format {
                    duration: Some("10.01".to_string()),
                    ..Format::default()
                },
            }
        }

        #[test]
        fn test_probe_uses_ffprobe_beside_configured_ffmpeg() {
            let dir = tempfile::tempdir().unwrap();
            let json = dir.path().join("report.json");
            std::fs::write(&json, serde_json::to_string(&report()).unwrap()).unwrap();
            script(dir.path(), "ffmpeg", "exit 0");
            script(dir.path(), "ffprobe", &format!("cat \"{}\"", json.display()));

            let tool = MediaTool::from_path_unchecked(dir.path().join("ffmpeg"));
            assert_eq!(tool.ffprobe_path(), dir.path().join("ffprobe"));

            let info = probe(&tool.ffprobe_path(), Path::new("clip.mp4")).unwrap();
            assert_eq!((info.width, info.height), (1280, 720));
            assert!((info.fps - 30000.0 / 1001.0).abs() < 1e-9);
            assert_eq!(info.frame_count, Some(300));
            assert!(info.has_audio);
        }

        #[test]
        fn test_failing_or_garbled_probe_is_unreadable() {
            let dir = tempfile::tempdir().unwrap();
            script(dir.path(), "failing", "echo 'moov atom not found' >&2\nexit 1");
            script(dir.path(), "garbled", "echo 'not json'");

            match probe(&dir.path().join("failing"), Path::new("clip.mp4")) {
                Err(CoreError::UnreadableSource(_, msg)) => assert!(msg.contains("moov atom not found")),
                other => panic!("expected UnreadableSource, got {other:?}"),
            }
            match probe(&dir.path().join("garbled"), Path::new("clip.mp4")) {
                Err(CoreError::UnreadableSource(_, msg)) => assert!(msg.contains("parse")),
                other => panic!("expected UnreadableSource, got {other:?}"),
            }
        }

        #[test]
        fn test_audio_only_file_is_unreadable() {
            let dir = tempfile::tempdir().unwrap();
            let mut audio_only = report();
            audio_only.streams.remove(0);
            let json = dir.path().join("report.json");
            std::fs::write(&json, serde_json::to_string(&audio_only).unwrap()).unwrap();
            script(dir.path(), "ffprobe", &format!("cat \"{}\"", json.display()));

            match probe(&dir.path().join("ffprobe"), Path::new("song.m4a")) {
                Err(CoreError::UnreadableSource(_, msg)) => assert!(msg.contains("no video stream")),
                other => panic!("expected UnreadableSource, got {other:?}"),
            }
        }
    }
}
