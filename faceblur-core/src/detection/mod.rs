// ============================================================================
// faceblur-core/src/detection/mod.rs
// ============================================================================
//
// DETECTION: Per-Frame Object Detection
//
// This module defines the detector seam used by the pipeline. A detector is a
// pure function of (frame, threshold, loaded model): it keeps no state across
// frames and returns only boxes of the profile's target class.
//
// KEY COMPONENTS:
// - DetectionBox: Integer pixel rectangle with class id and confidence
// - Detector: Trait implemented by concrete detectors
// - OnnxYoloDetector: YOLO-family ONNX model run through ONNX Runtime
//
// AI-ASSISTANT-INFO: Detector trait and detection box type

// ---- Internal crate imports ----
use crate::error::CoreResult;
use crate::pipeline::Frame;

mod yolo;

pub use yolo::{OnnxYoloDetector, YOLO_INPUT_SIZE};

/// Axis-aligned detection in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub class_id: usize,
    pub confidence: f32,
}

impl DetectionBox {
    /// Signed width; widened so boxes spanning the whole `i32` range do not
    /// overflow.
    #[must_use]
    pub fn width(&self) -> i64 {
        i64::from(self.x2) - i64::from(self.x1)
    }

    #[must_use]
    pub fn height(&self) -> i64 {
        i64::from(self.y2) - i64::from(self.y1)
    }
}

/// Something that finds the target class in a frame.
pub trait Detector {
    /// Returns boxes of the target class whose confidence is at least
    /// `confidence_threshold`. Any failure aborts the run.
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> CoreResult<Vec<DetectionBox>>;
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> CoreResult<Vec<DetectionBox>> {
        (**self).detect(frame, confidence_threshold)
    }
}

impl<D: Detector + ?Sized> Detector for &mut D {
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> CoreResult<Vec<DetectionBox>> {
        (**self).detect(frame, confidence_threshold)
    }
}
