//! ffmpeg-backed frame streams.
//!
//! The source decodes the first video stream to raw RGB24 frames on ffmpeg's
//! stdout and reads them through the sidecar event iterator. The sink feeds
//! raw RGB24 frames into a second ffmpeg over stdin, which encodes them
//! (MPEG-4 Part 2, no audio) to the output file.

use super::{Frame, FrameSink, FrameSource};
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::external::{FfmpegCommandBuilder, MediaTool, StreamInfo, probe};

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::iter::FfmpegIterator;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ChildStdin;
use std::thread::JoinHandle;

/// Error lines kept from the encoder's stderr for error messages.
const STDERR_TAIL_LINES: usize = 20;

// ============================================================================
// SOURCE
// ============================================================================

/// Decodes frames from a video file with ffmpeg.
pub struct SidecarFrameSource {
    path: PathBuf,
    info: StreamInfo,
    child: Option<FfmpegChild>,
    events: FfmpegIterator,
    errors: Vec<String>,
    finished: bool,
}

impl SidecarFrameSource {
    /// Probes `path` with the tool's ffprobe and starts decoding it.
    ///
    /// A file that cannot be probed, has no video stream, or cannot be
    /// handed to the decoder fails with `UnreadableSource`.
    pub fn open(tool: &MediaTool, path: &Path) -> CoreResult<Self> {
        let info = probe(&tool.ffprobe_path(), path)?;
        let unreadable = |msg: String| CoreError::UnreadableSource(path.to_path_buf(), msg);

        let mut cmd = tool.command();
        cmd.input(&*path.to_string_lossy())
            .args(["-map", "0:v:0"])
            .rawvideo();

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (decode)", e))?;
        let events = child
            .iter()
            .map_err(|e| unreadable(format!("cannot read decoder output: {e}")))?;

        log::debug!("Decoding {} as raw RGB24", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            info,
            child: Some(child),
            events,
            errors: Vec::new(),
            finished: false,
        })
    }

    /// Waits for the decoder and fails if it exited unsuccessfully.
    fn finish_decoder(&mut self) -> CoreResult<()> {
        self.finished = true;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (decode)", e))?;
        if !status.success() {
            return Err(CoreError::FrameDecode(format!(
                "decoder exited with {} while reading {}: {}",
                status,
                self.path.display(),
                self.errors.join("\n")
            )));
        }
        Ok(())
    }
}

impl FrameSource for SidecarFrameSource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }
        while let Some(event) = self.events.next() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    let (width, height) = (frame.width, frame.height);
                    return Frame::from_raw(width, height, frame.data).map(Some).ok_or_else(|| {
                        CoreError::FrameDecode(format!("short frame buffer for {width}x{height} frame"))
                    });
                }
                FfmpegEvent::Error(line) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                    log::debug!("decoder: {}", line);
                    self.errors.push(line);
                }
                FfmpegEvent::Log(_, line) => log::trace!("decoder: {}", line),
                FfmpegEvent::Done => break,
                _ => {}
            }
        }
        self.finish_decoder()?;
        Ok(None)
    }

    fn close(&mut self) -> CoreResult<()> {
        if let Some(mut child) = self.child.take() {
            // Still running means the caller stopped early.
            if let Err(e) = child.kill() {
                log::debug!("Decoder already exited: {}", e);
            }
            child
                .wait()
                .map_err(|e| command_wait_error("ffmpeg (decode)", e))?;
        }
        self.finished = true;
        Ok(())
    }
}

impl Drop for SidecarFrameSource {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::debug!("Error closing decoder on drop: {}", e);
        }
    }
}

// ============================================================================
// SINK
// ============================================================================

/// Encodes frames to a video file with ffmpeg.
///
/// The encoder starts on the first frame and takes its size from that frame,
/// so decoded frames that differ from the probed size (autorotated sources,
/// for one) are encoded as delivered.
pub struct SidecarFrameSink {
    tool: MediaTool,
    output: PathBuf,
    fps: f64,
    encoder: Option<RunningEncoder>,
    finished: bool,
}

/// An encoder process fed over stdin.
struct RunningEncoder {
    width: u32,
    height: u32,
    child: FfmpegChild,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<Vec<String>>>,
}

impl RunningEncoder {
    fn spawn(tool: &MediaTool, output: &Path, width: u32, height: u32, fps: f64) -> CoreResult<Self> {
        let size = format!("{width}x{height}");
        let rate = format!("{fps}");

        let mut cmd = FfmpegCommandBuilder::new(tool.path())
            .with_overwrite(true)
            .build();
        cmd.args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-s", size.as_str(), "-r", rate.as_str()])
            .input("-")
            .args(["-an", "-c:v", "mpeg4", "-q:v", "2", "-pix_fmt", "yuv420p"])
            .output(&*output.to_string_lossy());

        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (encode)", e))?;
        let Some(stdin) = child.take_stdin() else {
            if let Err(e) = child.kill() {
                log::debug!("Encoder already exited: {}", e);
            }
            return Err(command_start_error(
                "ffmpeg (encode)",
                std::io::Error::other("encoder stdin unavailable"),
            ));
        };
        let stderr_drain = child.take_stderr().map(|stderr| {
            std::thread::spawn(move || {
                let mut tail = Vec::new();
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    log::trace!("encoder: {}", line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.remove(0);
                    }
                    tail.push(line);
                }
                tail
            })
        });

        log::debug!("Encoding {} frames to {}", size, output.display());
        Ok(Self {
            width,
            height,
            child,
            stdin: Some(stdin),
            stderr_drain,
        })
    }

    fn stderr_tail(&mut self) -> String {
        self.stderr_drain
            .take()
            .and_then(|handle| handle.join().ok())
            .map(|lines| lines.join("\n"))
            .unwrap_or_default()
    }
}

impl SidecarFrameSink {
    /// Sink writing `output` at `fps`. Any existing file at `output` is
    /// replaced once the first frame arrives.
    #[must_use]
    pub fn new(tool: &MediaTool, output: &Path, fps: f64) -> Self {
        Self {
            tool: tool.clone(),
            output: output.to_path_buf(),
            fps,
            encoder: None,
            finished: false,
        }
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Size the encoder was started with, once a frame has been written.
    #[must_use]
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.encoder.as_ref().map(|e| (e.width, e.height))
    }
}

impl FrameSink for SidecarFrameSink {
    fn write_frame(&mut self, frame: &Frame) -> CoreResult<()> {
        if self.finished {
            return Err(CoreError::InvalidState("write after finish".to_string()));
        }
        if self.encoder.is_none() {
            let (width, height) = frame.dimensions();
            self.encoder = Some(RunningEncoder::spawn(&self.tool, &self.output, width, height, self.fps)?);
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(CoreError::InvalidState("encoder not running".to_string()));
        };
        if frame.dimensions() != (encoder.width, encoder.height) {
            return Err(CoreError::FrameDecode(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width(),
                frame.height(),
                encoder.width,
                encoder.height
            )));
        }
        let stdin = encoder
            .stdin
            .as_mut()
            .ok_or_else(|| CoreError::InvalidState("write after finish".to_string()))?;
        stdin.write_all(frame.as_raw())?;
        Ok(())
    }

    fn finish(&mut self) -> CoreResult<()> {
        if std::mem::replace(&mut self.finished, true) {
            return Ok(());
        }
        let Some(mut encoder) = self.encoder.take() else {
            return Err(CoreError::OutputNotProduced(self.output.clone()));
        };
        // Closing stdin tells the encoder the stream has ended.
        drop(encoder.stdin.take());
        let status = encoder
            .child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (encode)", e))?;
        let stderr = encoder.stderr_tail();
        if !status.success() {
            return Err(command_failed_error("ffmpeg (encode)", status, stderr));
        }
        if !self.output.exists() {
            return Err(CoreError::OutputNotProduced(self.output.clone()));
        }
        Ok(())
    }
}

impl Drop for SidecarFrameSink {
    fn drop(&mut self) {
        if let Some(mut encoder) = self.encoder.take() {
            drop(encoder.stdin.take());
            if let Err(e) = encoder.child.kill() {
                log::debug!("Encoder already exited: {}", e);
            }
            if let Err(e) = encoder.child.wait() {
                log::debug!("Error waiting for encoder on drop: {}", e);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use image::Rgb;
    use std::os::unix::fs::PermissionsExt;

    /// Stand-in encoder: records its arguments and copies stdin to the
    /// output path (its last argument).
    fn recording_tool(dir: &Path) -> MediaTool {
        let script = dir.join("ffmpeg");
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"{}\"\nfor last; do :; done\ncat > \"$last\"\n",
            dir.join("args.txt").display()
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        MediaTool::from_path_unchecked(script)
    }

    fn portrait_frame() -> Frame {
        Frame::from_pixel(8, 16, Rgb([10, 20, 30]))
    }

    #[test]
    fn test_encoder_takes_size_from_first_frame() {
        let dir = tempfile::tempdir().unwrap();
        let tool = recording_tool(dir.path());
        let output = dir.path().join("blurred_clip.mp4");

        let mut sink = SidecarFrameSink::new(&tool, &output, 25.0);
        assert_eq!(sink.frame_size(), None);
        sink.write_frame(&portrait_frame()).unwrap();
        sink.write_frame(&portrait_frame()).unwrap();
        assert_eq!(sink.frame_size(), Some((8, 16)));
        sink.finish().unwrap();

        let args: Vec<String> = std::fs::read_to_string(dir.path().join("args.txt"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        let size = args.iter().position(|a| a == "-s").unwrap();
        assert_eq!(args[size + 1], "8x16");
        let rate = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[rate + 1], "25");
        assert_eq!(std::fs::metadata(&output).unwrap().len(), 2 * 8 * 16 * 3);
    }

    #[test]
    fn test_frame_size_change_mid_stream_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tool = recording_tool(dir.path());
        let output = dir.path().join("blurred_clip.mp4");

        let mut sink = SidecarFrameSink::new(&tool, &output, 30.0);
        sink.write_frame(&portrait_frame()).unwrap();
        let landscape = Frame::from_pixel(16, 8, Rgb([10, 20, 30]));
        assert!(matches!(sink.write_frame(&landscape), Err(CoreError::FrameDecode(_))));
    }

    #[test]
    fn test_finish_without_frames_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let tool = recording_tool(dir.path());
        let output = dir.path().join("blurred_clip.mp4");

        let mut sink = SidecarFrameSink::new(&tool, &output, 25.0);
        assert!(matches!(sink.finish(), Err(CoreError::OutputNotProduced(_))));
        assert!(!dir.path().join("args.txt").exists());
        assert!(matches!(
            sink.write_frame(&portrait_frame()),
            Err(CoreError::InvalidState(_))
        ));
    }
}
