// ============================================================================
// faceblur-core/src/pipeline/mod.rs
// ============================================================================
//
// FRAME PROCESSING PIPELINE: Detect, Smooth, Blur, Write
//
// This module drives a video through the detector frame by frame. Each frame
// is run through the detector, its boxes are pushed into the temporal buffer,
// every buffered box is blurred on the frame, and the frame is written to the
// sink. Frames are processed strictly in order; none is skipped or repeated.
//
// The pipeline is an explicit state machine:
//
//   Idle -> Opened -> Streaming -> Draining -> Closed
//
// with Failed reachable from every state after Idle. Any I/O, decode, encode
// or detector failure is fatal.
//
// KEY COMPONENTS:
// - FrameSource / FrameSink: Sequential frame input and output
// - FrameProcessingPipeline: The state machine described above
// - ProcessingEstimate / PipelineSummary: Values reported before and after
// - SidecarFrameSource / SidecarFrameSink: ffmpeg-backed streams (video_io.rs)
// - MemoryFrameSource / MemoryFrameSink: In-memory streams (memory.rs)
//
// AI-ASSISTANT-INFO: Per-frame detect/buffer/blur loop and its state machine

// ---- Internal crate imports ----
use crate::blur::RegionBlurrer;
use crate::buffer::TemporalBoxBuffer;
use crate::detection::Detector;
use crate::error::{CoreError, CoreResult};
use crate::external::StreamInfo;
use crate::profile::ModelProfile;
use crate::progress_reporting::{OutputLevel, ProgressReporter};

// ---- Standard library imports ----
use std::fmt;
use std::time::{Duration, Instant};

// ============================================================================
// SUBMODULES
// ============================================================================

mod memory;
mod video_io;

pub use memory::{MemoryFrameSink, MemoryFrameSource};
pub use video_io::{SidecarFrameSink, SidecarFrameSource};

/// One decoded video frame, 8-bit RGB.
pub type Frame = image::RgbImage;

// ============================================================================
// STREAM TRAITS
// ============================================================================

/// Sequential source of decoded frames.
pub trait FrameSource {
    /// Properties of the stream being read.
    fn info(&self) -> &StreamInfo;

    /// Next frame in presentation order, or `None` at end of stream.
    fn next_frame(&mut self) -> CoreResult<Option<Frame>>;

    /// Releases the underlying stream. Called once, also after failures.
    fn close(&mut self) -> CoreResult<()>;
}

/// Sequential consumer of processed frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> CoreResult<()>;

    /// Flushes and closes the output.
    fn finish(&mut self) -> CoreResult<()>;
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Opened,
    Streaming,
    Draining,
    Closed,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Projected processing time, known once the stream is open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingEstimate {
    pub frame_count: Option<u64>,
    /// `None` when the stream does not report a frame count.
    pub duration: Option<Duration>,
}

/// Outcome of a completed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    pub frames_processed: u64,
    pub elapsed: Duration,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Per-frame detect, buffer, blur and write loop.
pub struct FrameProcessingPipeline<D: Detector, S: FrameSource> {
    detector: D,
    blurrer: RegionBlurrer,
    buffer: TemporalBoxBuffer,
    profile: ModelProfile,
    confidence_threshold: f32,
    source: Option<S>,
    state: PipelineState,
}

impl<D: Detector, S: FrameSource> FrameProcessingPipeline<D, S> {
    /// Creates an idle pipeline using `profile`'s blur style.
    pub fn new(detector: D, profile: ModelProfile, confidence_threshold: f32) -> Self {
        Self {
            detector,
            blurrer: RegionBlurrer::new(profile.blur_style()),
            buffer: TemporalBoxBuffer::new(),
            profile,
            confidence_threshold,
            source: None,
            state: PipelineState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Properties of the open stream, if any.
    #[must_use]
    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.source.as_ref().map(FrameSource::info)
    }

    /// `Idle -> Opened`: opens the input through `opener`.
    ///
    /// An opener failure (typically `UnreadableSource`) moves the pipeline
    /// to `Failed`.
    pub fn open<F>(&mut self, opener: F) -> CoreResult<StreamInfo>
    where
        F: FnOnce() -> CoreResult<S>,
    {
        self.expect_state(PipelineState::Idle, "open")?;
        match opener() {
            Ok(source) => {
                let info = source.info().clone();
                log::debug!(
                    "Opened stream {}x{} @ {:.3} fps, frames: {:?}",
                    info.width,
                    info.height,
                    info.fps,
                    info.frame_count
                );
                self.source = Some(source);
                self.state = PipelineState::Opened;
                Ok(info)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    /// Processing-time estimate for the open stream.
    pub fn estimate(&self) -> CoreResult<ProcessingEstimate> {
        let info = self
            .stream_info()
            .ok_or_else(|| CoreError::InvalidState(format!("no open stream in state {}", self.state)))?;
        Ok(ProcessingEstimate {
            frame_count: info.frame_count,
            duration: info.frame_count.map(|frames| self.profile.estimate(frames)),
        })
    }

    /// `Opened -> Streaming`: reports the estimate and asks `confirm`
    /// whether to go ahead.
    ///
    /// Declining closes the source, moves to `Failed` and returns
    /// `Cancelled` before any frame is read.
    pub fn begin<C>(&mut self, progress: &dyn ProgressReporter, confirm: C) -> CoreResult<ProcessingEstimate>
    where
        C: FnOnce(&ProcessingEstimate) -> bool,
    {
        self.expect_state(PipelineState::Opened, "begin")?;
        let estimate = self.estimate()?;
        progress.estimate(estimate.frame_count, estimate.duration);
        match estimate.duration {
            Some(duration) => log::info!(
                "Estimated processing time for {} frames: {}",
                estimate.frame_count.unwrap_or_default(),
                crate::utils::format_estimate(duration)
            ),
            None => log::info!("Frame count unknown, skipping processing-time estimate"),
        }

        if !confirm(&estimate) {
            log::info!("Run declined before processing");
            self.abort();
            return Err(CoreError::Cancelled);
        }

        self.state = PipelineState::Streaming;
        Ok(estimate)
    }

    /// `Streaming -> Draining -> Closed`: processes every frame into `sink`.
    ///
    /// Any failure closes both streams, moves the pipeline to `Failed` and
    /// is returned unchanged.
    pub fn run<K: FrameSink>(&mut self, sink: &mut K, progress: &dyn ProgressReporter) -> CoreResult<PipelineSummary> {
        self.expect_state(PipelineState::Streaming, "run")?;
        let started = Instant::now();

        let frames_processed = match self.stream_all(sink, progress) {
            Ok(count) => count,
            Err(e) => {
                progress.finish_frames();
                log::error!("Frame processing failed: {}", e);
                self.abort();
                if let Err(finish_err) = sink.finish() {
                    log::debug!("Ignoring sink close error after failure: {}", finish_err);
                }
                return Err(e);
            }
        };
        progress.finish_frames();

        self.state = PipelineState::Draining;
        let drained = self.close_source().and_then(|()| sink.finish());
        if let Err(e) = drained {
            self.state = PipelineState::Failed;
            return Err(e);
        }

        self.state = PipelineState::Closed;
        let summary = PipelineSummary {
            frames_processed,
            elapsed: started.elapsed(),
        };
        progress.output(
            OutputLevel::Success,
            &format!("Processed {} frames", summary.frames_processed),
        );
        log::info!(
            "Processed {} frames in {}",
            summary.frames_processed,
            crate::utils::format_duration(summary.elapsed.as_secs_f64())
        );
        Ok(summary)
    }

    /// Moves to `Failed`, closing the source if one is open.
    pub fn abort(&mut self) {
        if let Err(e) = self.close_source() {
            log::debug!("Ignoring source close error during abort: {}", e);
        }
        self.state = PipelineState::Failed;
    }

    fn stream_all<K: FrameSink>(&mut self, sink: &mut K, progress: &dyn ProgressReporter) -> CoreResult<u64> {
        let total = self.stream_info().and_then(|info| info.frame_count);
        let mut frames_processed = 0u64;
        loop {
            let source = self
                .source
                .as_mut()
                .ok_or_else(|| CoreError::InvalidState("source closed while streaming".to_string()))?;
            let Some(mut frame) = source.next_frame()? else {
                break;
            };

            self.process_frame(&mut frame)?;
            sink.write_frame(&frame)?;

            frames_processed += 1;
            progress.frame_done(frames_processed, total);
        }
        Ok(frames_processed)
    }

    /// Detects, buffers and blurs one frame in place.
    fn process_frame(&mut self, frame: &mut Frame) -> CoreResult<()> {
        let boxes = self.detector.detect(frame, self.confidence_threshold)?;
        log::trace!("{} detections", boxes.len());
        self.buffer.push(boxes);
        for bbox in self.buffer.all_boxes() {
            self.blurrer.apply(frame, bbox);
        }
        Ok(())
    }

    fn close_source(&mut self) -> CoreResult<()> {
        match self.source.take() {
            Some(mut source) => source.close(),
            None => Ok(()),
        }
    }

    fn expect_state(&self, expected: PipelineState, operation: &str) -> CoreResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CoreError::InvalidState(format!(
                "cannot {} in state {} (expected {})",
                operation, self.state, expected
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionBox;
    use crate::progress_reporting::NullProgressReporter;
    use image::Rgb;
    use std::cell::Cell;

    /// Detector returning a fixed box on chosen call indices.
    struct ScriptedDetector {
        calls: usize,
        hits: Vec<usize>,
        fail_on: Option<usize>,
    }

    impl ScriptedDetector {
        fn hits(hits: &[usize]) -> Self {
            Self {
                calls: 0,
                hits: hits.to_vec(),
                fail_on: None,
            }
        }
    }

    impl Detector for ScriptedDetector {
        fn detect(&mut self, _frame: &Frame, _threshold: f32) -> CoreResult<Vec<DetectionBox>> {
            let index = self.calls;
            self.calls += 1;
            if self.fail_on == Some(index) {
                return Err(CoreError::Detection("inference failed".to_string()));
            }
            Ok(if self.hits.contains(&index) {
                vec![DetectionBox {
                    x1: 20,
                    y1: 20,
                    x2: 60,
                    y2: 60,
                    class_id: 0,
                    confidence: 0.9,
                }]
            } else {
                Vec::new()
            })
        }
    }

    fn checkerboard() -> Frame {
        Frame::from_fn(96, 96, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    fn pipeline(detector: ScriptedDetector) -> FrameProcessingPipeline<ScriptedDetector, MemoryFrameSource> {
        FrameProcessingPipeline::new(detector, ModelProfile::FaceNano, 0.3)
    }

    #[test]
    fn test_buffered_boxes_blur_following_frames() {
        let original = checkerboard();
        let mut pipeline = pipeline(ScriptedDetector::hits(&[4]));
        pipeline
            .open(|| Ok(MemoryFrameSource::new(vec![original.clone(); 10], 25.0)))
            .unwrap();
        pipeline.begin(&NullProgressReporter, |_| true).unwrap();

        let mut sink = MemoryFrameSink::new();
        let summary = pipeline.run(&mut sink, &NullProgressReporter).unwrap();

        assert_eq!(summary.frames_processed, 10);
        assert_eq!(pipeline.state(), PipelineState::Closed);
        assert!(sink.is_finished());

        let frames = sink.frames();
        assert_eq!(frames.len(), 10);
        for (index, frame) in frames.iter().enumerate() {
            let blurred = frame != &original;
            assert_eq!(blurred, (4..=6).contains(&index), "frame {index}");
        }
    }

    #[test]
    fn test_estimate_uses_profile_constant() {
        let mut pipeline = pipeline(ScriptedDetector::hits(&[]));
        assert!(pipeline.estimate().is_err());
        pipeline
            .open(|| Ok(MemoryFrameSource::new(vec![checkerboard(); 1000], 25.0)))
            .unwrap();

        let estimate = pipeline.estimate().unwrap();
        assert_eq!(estimate.frame_count, Some(1000));
        assert_eq!(estimate.duration, Some(ModelProfile::FaceNano.estimate(1000)));
    }

    #[test]
    fn test_declined_confirmation_cancels_before_any_frame() {
        let mut pipeline = pipeline(ScriptedDetector::hits(&[]));
        pipeline
            .open(|| Ok(MemoryFrameSource::new(vec![checkerboard(); 3], 25.0)))
            .unwrap();

        let asked = Cell::new(false);
        let result = pipeline.begin(&NullProgressReporter, |_| {
            asked.set(true);
            false
        });
        assert!(asked.get());
        assert!(matches!(result, Err(CoreError::Cancelled)));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(pipeline.detector.calls, 0);
    }

    #[test]
    fn test_open_failure_moves_to_failed() {
        let mut pipeline = pipeline(ScriptedDetector::hits(&[]));
        let result = pipeline.open(|| {
            Err(CoreError::UnreadableSource(
                "missing.mp4".into(),
                "no video stream".to_string(),
            ))
        });
        assert!(matches!(result, Err(CoreError::UnreadableSource(..))));
        assert_eq!(pipeline.state(), PipelineState::Failed);
    }

    #[test]
    fn test_detector_failure_is_fatal() {
        let mut detector = ScriptedDetector::hits(&[]);
        detector.fail_on = Some(2);
        let mut pipeline = pipeline(detector);
        pipeline
            .open(|| Ok(MemoryFrameSource::new(vec![checkerboard(); 5], 25.0)))
            .unwrap();
        pipeline.begin(&NullProgressReporter, |_| true).unwrap();

        let mut sink = MemoryFrameSink::new();
        let result = pipeline.run(&mut sink, &NullProgressReporter);
        assert!(matches!(result, Err(CoreError::Detection(_))));
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(sink.frames().len(), 2);
    }

    #[test]
    fn test_operations_out_of_order_are_rejected() {
        let mut pipeline = pipeline(ScriptedDetector::hits(&[]));
        let mut sink = MemoryFrameSink::new();
        assert!(matches!(
            pipeline.run(&mut sink, &NullProgressReporter),
            Err(CoreError::InvalidState(_))
        ));
        assert!(matches!(
            pipeline.begin(&NullProgressReporter, |_| true),
            Err(CoreError::InvalidState(_))
        ));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn test_frames_keep_decoded_size_when_probe_disagrees() {
        // Probed as landscape, decoded as portrait (rotation metadata).
        let portrait = Frame::from_fn(48, 96, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let info = MemoryFrameSource::info_for(96, 48, 25.0, 3);
        let mut pipeline = pipeline(ScriptedDetector::hits(&[0]));
        pipeline
            .open(|| Ok(MemoryFrameSource::with_info(vec![portrait.clone(); 3], info)))
            .unwrap();
        pipeline.begin(&NullProgressReporter, |_| true).unwrap();

        let mut sink = MemoryFrameSink::new();
        let summary = pipeline.run(&mut sink, &NullProgressReporter).unwrap();
        assert_eq!(summary.frames_processed, 3);
        for frame in sink.frames() {
            assert_eq!(frame.dimensions(), (48, 96));
            assert_ne!(frame, &portrait);
        }
    }

    #[test]
    fn test_empty_stream_closes_cleanly() {
        let mut pipeline = pipeline(ScriptedDetector::hits(&[]));
        pipeline
            .open(|| Ok(MemoryFrameSource::with_info(Vec::new(), MemoryFrameSource::info_for(16, 16, 25.0, 0))))
            .unwrap();
        pipeline.begin(&NullProgressReporter, |_| true).unwrap();
        let mut sink = MemoryFrameSink::new();
        let summary = pipeline.run(&mut sink, &NullProgressReporter).unwrap();
        assert_eq!(summary.frames_processed, 0);
        assert_eq!(pipeline.state(), PipelineState::Closed);
    }
}
