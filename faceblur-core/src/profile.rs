//! Detector model profiles.
//!
//! Each supported model identifier maps to exactly one [`ModelProfile`], which
//! fixes the weights file, the class kept from the detector output, the blur
//! style applied to every box, and the per-frame cost used for the run-time
//! estimate. Identifiers are resolved once while validating settings.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a detected region is redacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurStyle {
    /// Gaussian blur composited through an ellipse inscribed in the region.
    EllipseGaussian,
    /// Gaussian blur over the whole region.
    RectGaussian,
    /// Flat 51x51 box blur over the raw detection.
    BoxBlur,
}

impl BlurStyle {
    /// Factor applied to box width and height before blurring.
    #[must_use]
    pub fn scale_factor(self) -> f64 {
        match self {
            BlurStyle::BoxBlur => 1.0,
            BlurStyle::EllipseGaussian | BlurStyle::RectGaussian => 1.6,
        }
    }
}

impl fmt::Display for BlurStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlurStyle::EllipseGaussian => "ellipse gaussian",
            BlurStyle::RectGaussian => "rectangle gaussian",
            BlurStyle::BoxBlur => "box blur",
        };
        f.write_str(name)
    }
}

/// Known detector models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelProfile {
    /// `YOLOv8n-face.pt`: fast face detector.
    FaceNano,
    /// `yolov8m-face.pt`: slower, more accurate face detector.
    FaceMedium,
    /// `best_re_final.pt`: head detector.
    Head,
    /// `yolov8s.pt`: general detector, class 0 (person).
    Person,
    /// `head accurate`: head detector weights with a hard box blur.
    HeadAccurate,
}

impl ModelProfile {
    pub const ALL: [ModelProfile; 5] = [
        ModelProfile::FaceNano,
        ModelProfile::FaceMedium,
        ModelProfile::Head,
        ModelProfile::Person,
        ModelProfile::HeadAccurate,
    ];

    /// Resolves a settings identifier, failing with `UnknownModel`.
    pub fn from_identifier(identifier: &str) -> CoreResult<Self> {
        let wanted = identifier.trim();
        ModelProfile::ALL
            .into_iter()
            .find(|profile| profile.identifier() == wanted)
            .ok_or_else(|| CoreError::UnknownModel(identifier.to_string()))
    }

    /// Identifier as written in settings.
    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            ModelProfile::FaceNano => "YOLOv8n-face.pt",
            ModelProfile::FaceMedium => "yolov8m-face.pt",
            ModelProfile::Head => "best_re_final.pt",
            ModelProfile::Person => "yolov8s.pt",
            ModelProfile::HeadAccurate => "head accurate",
        }
    }

    /// ONNX export of the weights, looked up in the model directory.
    #[must_use]
    pub fn weights_file(self) -> &'static str {
        match self {
            ModelProfile::FaceNano => "YOLOv8n-face.onnx",
            ModelProfile::FaceMedium => "yolov8m-face.onnx",
            ModelProfile::Head | ModelProfile::HeadAccurate => "best_re_final.onnx",
            ModelProfile::Person => "yolov8s.onnx",
        }
    }

    /// Class id kept from the detector output.
    #[must_use]
    pub fn target_class(self) -> usize {
        0
    }

    #[must_use]
    pub fn blur_style(self) -> BlurStyle {
        match self {
            ModelProfile::FaceNano | ModelProfile::FaceMedium | ModelProfile::Head => {
                BlurStyle::EllipseGaussian
            }
            ModelProfile::Person => BlurStyle::RectGaussian,
            ModelProfile::HeadAccurate => BlurStyle::BoxBlur,
        }
    }

    /// Measured processing cost per frame, in seconds.
    #[must_use]
    pub fn seconds_per_frame(self) -> f64 {
        let minutes_per_frame = match self {
            ModelProfile::FaceNano => 0.003_135_537_881_884_5,
            ModelProfile::FaceMedium => 0.030_292_887,
            ModelProfile::Head | ModelProfile::Person | ModelProfile::HeadAccurate => {
                0.028_678_743_96
            }
        };
        minutes_per_frame * 60.0
    }

    /// Projected processing time for `frame_count` frames.
    #[must_use]
    pub fn estimate(self, frame_count: u64) -> Duration {
        Duration::from_secs_f64(self.seconds_per_frame() * frame_count as f64)
    }
}

impl FromStr for ModelProfile {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        ModelProfile::from_identifier(s)
    }
}

impl fmt::Display for ModelProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
