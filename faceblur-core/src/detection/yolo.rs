//! YOLO detector backed by ONNX Runtime.
//!
//! Expects a YOLOv8-style export: one `[1, 3, 640, 640]` float input in RGB
//! order scaled to `[0, 1]`, and one `[1, 4 + classes, anchors]` output where
//! each anchor column holds `cx, cy, w, h` followed by per-class scores.

use super::{DetectionBox, Detector};
use crate::error::{CoreError, CoreResult};
use crate::pipeline::Frame;

use image::imageops::{self, FilterType};
use ndarray::Array4;
use ort::inputs;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use std::path::Path;

/// Side of the square model input.
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Boxes overlapping a kept box by more than this are suppressed.
const NMS_IOU_THRESHOLD: f32 = 0.7;

/// Upper bound on detections kept per frame.
const MAX_DETECTIONS: usize = 300;

/// ONNX YOLO model filtered to a single class.
pub struct OnnxYoloDetector {
    session: Session,
    input_name: String,
    target_class: usize,
}

impl OnnxYoloDetector {
    /// Loads the model at `weights`, keeping only `target_class` detections.
    pub fn load(weights: &Path, target_class: usize) -> CoreResult<Self> {
        if !weights.is_file() {
            return Err(CoreError::Detection(format!(
                "model weights not found at {}",
                weights.display()
            )));
        }

        let session = load_session(weights).map_err(|e| {
            CoreError::Detection(format!("failed to load model {}: {e}", weights.display()))
        })?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                CoreError::Detection(format!("model {} declares no inputs", weights.display()))
            })?;

        log::debug!(
            "Loaded detector {} (input '{}', class {})",
            weights.display(),
            input_name,
            target_class
        );

        Ok(Self {
            session,
            input_name,
            target_class,
        })
    }
}

impl Detector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame, confidence_threshold: f32) -> CoreResult<Vec<DetectionBox>> {
        let input = preprocess(frame);
        let (shape, data) = infer(&mut self.session, &self.input_name, input)?;

        let params = DecodeParams {
            target_class: self.target_class,
            confidence_threshold,
            scale_x: frame.width() as f32 / YOLO_INPUT_SIZE as f32,
            scale_y: frame.height() as f32 / YOLO_INPUT_SIZE as f32,
            frame_width: frame.width(),
            frame_height: frame.height(),
        };
        decode_predictions(&shape, &data, &params)
    }
}

fn load_session(path: &Path) -> ort::Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(4)?
        .commit_from_file(path)
}

/// Runs the session and copies out the first output tensor.
fn infer(session: &mut Session, input_name: &str, input: Array4<f32>) -> ort::Result<(Vec<usize>, Vec<f32>)> {
    let shape: Vec<usize> = input.shape().to_vec();
    let (data, _offset) = input.into_raw_vec_and_offset();
    let tensor = Tensor::from_array(([shape[0], shape[1], shape[2], shape[3]], data))?;
    let outputs = session.run(inputs![input_name => tensor])?;
    let (out_shape, out_data) = outputs[0].try_extract_tensor::<f32>()?;
    let out_shape = out_shape.iter().map(|&dim| dim.max(0) as usize).collect();
    Ok((out_shape, out_data.to_vec()))
}

/// Resizes the frame to the model input and converts it to NCHW floats.
fn preprocess(frame: &Frame) -> Array4<f32> {
    let resized = imageops::resize(frame, YOLO_INPUT_SIZE, YOLO_INPUT_SIZE, FilterType::Triangle);
    let side = YOLO_INPUT_SIZE as usize;
    let mut input = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            input[[0, channel, y as usize, x as usize]] = f32::from(pixel[channel]) / 255.0;
        }
    }
    input
}

/// Frame-dependent values needed to turn raw predictions into boxes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeParams {
    pub target_class: usize,
    pub confidence_threshold: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub frame_width: u32,
    pub frame_height: u32,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    score: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    fn iou(&self, other: &Candidate) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }
}

/// Decodes a `[1, 4 + classes, anchors]` prediction tensor.
///
/// Each anchor takes its best-scoring class; anchors whose best class is
/// not the target, or whose score is below the threshold, are dropped. The
/// survivors go through greedy non-maximum suppression and are mapped back
/// to frame pixels.
pub(crate) fn decode_predictions(shape: &[usize], data: &[f32], params: &DecodeParams) -> CoreResult<Vec<DetectionBox>> {
    let [1, rows, anchors] = *shape else {
        return Err(CoreError::Detection(format!(
            "unexpected model output shape {shape:?}"
        )));
    };
    if rows < 5 || data.len() < rows * anchors {
        return Err(CoreError::Detection(format!(
            "model output {shape:?} does not hold box coordinates and class scores"
        )));
    }
    let num_classes = rows - 4;
    if params.target_class >= num_classes {
        return Err(CoreError::Detection(format!(
            "target class {} is outside the model's {} classes",
            params.target_class, num_classes
        )));
    }

    let at = |row: usize, anchor: usize| data[row * anchors + anchor];

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let (best_class, best_score) = (0..num_classes)
            .map(|class| (class, at(4 + class, anchor)))
            .fold((0, f32::MIN), |best, current| if current.1 > best.1 { current } else { best });

        if best_class != params.target_class || best_score < params.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, anchor), at(1, anchor), at(2, anchor), at(3, anchor));
        candidates.push(Candidate {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            score: best_score,
        });
    }

    let kept = non_max_suppression(candidates, NMS_IOU_THRESHOLD);

    let max_x = params.frame_width as f32;
    let max_y = params.frame_height as f32;
    Ok(kept
        .into_iter()
        .map(|c| DetectionBox {
            x1: (c.x1 * params.scale_x).clamp(0.0, max_x) as i32,
            y1: (c.y1 * params.scale_y).clamp(0.0, max_y) as i32,
            x2: (c.x2 * params.scale_x).clamp(0.0, max_x) as i32,
            y2: (c.y2 * params.scale_y).clamp(0.0, max_y) as i32,
            class_id: params.target_class,
            confidence: c.score,
        })
        .collect())
}

fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= MAX_DETECTIONS {
            break;
        }
        if kept.iter().all(|k| k.iou(&candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept
}
