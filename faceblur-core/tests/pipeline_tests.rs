// ============================================================================
// faceblur-core/tests/pipeline_tests.rs
// ============================================================================
//
// INTEGRATION TESTS: Frame pipeline through the public API
//
// Drives FrameProcessingPipeline with in-memory frames and a scripted
// detector, checking which frames come out blurred.
//
// AI-ASSISTANT-INFO: End-to-end tests for the frame-processing pipeline

use faceblur_core::pipeline::{Frame, MemoryFrameSink, MemoryFrameSource};
use faceblur_core::progress_reporting::NullProgressReporter;
use faceblur_core::{
    CoreResult, DetectionBox, Detector, FrameProcessingPipeline, ModelProfile, PipelineState,
};
use image::Rgb;
use std::collections::HashMap;

const SIZE: u32 = 96;

fn checkerboard() -> Frame {
    Frame::from_fn(SIZE, SIZE, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgb([240, 240, 240])
        } else {
            Rgb([15, 15, 15])
        }
    })
}

/// Returns preset boxes by frame index and records the thresholds it saw.
struct ScriptedDetector {
    script: HashMap<usize, Vec<DetectionBox>>,
    calls: usize,
    thresholds: Vec<f32>,
}

impl ScriptedDetector {
    fn with_box_at(index: usize) -> Self {
        let bbox = DetectionBox {
            x1: 36,
            y1: 36,
            x2: 60,
            y2: 60,
            class_id: 0,
            confidence: 0.9,
        };
        Self {
            script: HashMap::from([(index, vec![bbox])]),
            calls: 0,
            thresholds: Vec::new(),
        }
    }
}

impl Detector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame, confidence_threshold: f32) -> CoreResult<Vec<DetectionBox>> {
        let boxes = self.script.get(&self.calls).cloned().unwrap_or_default();
        self.calls += 1;
        self.thresholds.push(confidence_threshold);
        Ok(boxes)
    }
}

fn run_ten_frames(profile: ModelProfile, detector: &mut ScriptedDetector) -> Vec<Frame> {
    let frames = vec![checkerboard(); 10];
    let mut pipeline = FrameProcessingPipeline::new(detector, profile, 0.25);
    pipeline
        .open(|| Ok(MemoryFrameSource::new(frames, 25.0)))
        .unwrap();
    pipeline.begin(&NullProgressReporter, |_| true).unwrap();

    let mut sink = MemoryFrameSink::new();
    let summary = pipeline.run(&mut sink, &NullProgressReporter).unwrap();
    assert_eq!(summary.frames_processed, 10);
    assert_eq!(pipeline.state(), PipelineState::Closed);
    assert!(sink.is_finished());
    sink.into_frames()
}

#[test]
fn test_detection_blurs_three_frames() {
    let original = checkerboard();
    let mut detector = ScriptedDetector::with_box_at(4);
    let output = run_ten_frames(ModelProfile::FaceNano, &mut detector);

    let blurred: Vec<usize> = output
        .iter()
        .enumerate()
        .filter(|(_, frame)| **frame != original)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(blurred, vec![4, 5, 6]);
    assert_eq!(detector.calls, 10);
    assert!(detector.thresholds.iter().all(|t| (*t - 0.25).abs() < f32::EPSILON));
}

#[test]
fn test_every_blur_style_is_deterministic() {
    for profile in [
        ModelProfile::FaceNano,
        ModelProfile::Person,
        ModelProfile::HeadAccurate,
    ] {
        let first = run_ten_frames(profile, &mut ScriptedDetector::with_box_at(0));
        let second = run_ten_frames(profile, &mut ScriptedDetector::with_box_at(0));
        assert_eq!(first, second, "{profile} output differs between runs");
        assert_ne!(first[0], checkerboard(), "{profile} left the detection unblurred");
        assert_eq!(first[3], checkerboard());
    }
}

#[test]
fn test_blurred_pixels_stay_near_the_detection() {
    let original = checkerboard();
    let output = run_ten_frames(ModelProfile::FaceNano, &mut ScriptedDetector::with_box_at(0));

    // Corners are far outside any expansion of the box.
    for (x, y) in [(0, 0), (SIZE - 1, 0), (0, SIZE - 1), (SIZE - 1, SIZE - 1)] {
        assert_eq!(output[0].get_pixel(x, y), original.get_pixel(x, y));
    }
    assert_ne!(output[0].get_pixel(48, 48), original.get_pixel(48, 48));
}

#[test]
fn test_estimate_uses_profile_rate() {
    let mut pipeline = FrameProcessingPipeline::new(
        ScriptedDetector::with_box_at(0),
        ModelProfile::FaceMedium,
        0.3,
    );
    pipeline
        .open(|| {
            Ok(MemoryFrameSource::with_info(
                Vec::new(),
                MemoryFrameSource::info_for(SIZE, SIZE, 30.0, 3000),
            ))
        })
        .unwrap();

    let estimate = pipeline.estimate().unwrap();
    assert_eq!(estimate.frame_count, Some(3000));
    assert_eq!(estimate.duration, Some(ModelProfile::FaceMedium.estimate(3000)));
}
