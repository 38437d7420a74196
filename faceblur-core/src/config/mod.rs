// ============================================================================
// faceblur-core/src/config/mod.rs
// ============================================================================
//
// CONFIGURATION: Run Settings for FaceBlur
//
// This module defines the immutable settings record for one run. Settings are
// assembled once (from a TOML file, the builder, or both), validated, and then
// passed by reference into every component. Nothing here is global.
//
// KEY COMPONENTS:
// - Settings: Validated, immutable settings for one run
// - Resolution: Preset resize targets with their pixel dimensions
// - CutRange: Start offset and duration of the trimmed section
// - SettingsBuilder: Fluent construction with validation (builder.rs)
// - SettingsFile: TOML representation of the settings (file.rs)
// - TimeFormat: mm:ss or raw-seconds parsing of time values (time.rs)
//
// AI-ASSISTANT-INFO: Immutable run settings, resolution table and validation

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::profile::ModelProfile;

// ---- Standard library imports ----
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// SUBMODULES
// ============================================================================

mod builder;
mod file;
mod time;

pub use builder::SettingsBuilder;
pub use file::{BlurSection, ModelSection, SettingsFile, VideoSection};
pub use time::TimeFormat;

// ============================================================================
// DEFAULTS
// ============================================================================

/// Default detector confidence threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// Default media tool, resolved through `PATH`.
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Default directory holding the ONNX model weights.
pub const DEFAULT_MODEL_DIR: &str = "models";

// ============================================================================
// RESOLUTION
// ============================================================================

/// Preset resize targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    P480,
    P720,
    P1080,
}

impl Resolution {
    /// All supported presets, smallest first.
    pub const ALL: [Resolution; 3] = [Resolution::P480, Resolution::P720, Resolution::P1080];

    /// Pixel dimensions (width, height) of this preset.
    #[must_use]
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::P480 => (854, 480),
            Resolution::P720 => (1280, 720),
            Resolution::P1080 => (1920, 1080),
        }
    }

    /// Token used in settings files and output file names ("720p").
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Resolution::P480 => "480p",
            Resolution::P720 => "720p",
            Resolution::P1080 => "1080p",
        }
    }
}

impl FromStr for Resolution {
    type Err = CoreError;

    fn from_str(token: &str) -> CoreResult<Self> {
        Resolution::ALL
            .into_iter()
            .find(|res| res.label() == token.trim())
            .ok_or_else(|| CoreError::UnsupportedResolution(token.to_string()))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// CUT RANGE
// ============================================================================

/// Section of the source kept by the cutter, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutRange {
    pub start_secs: u32,
    pub duration_secs: u32,
}

impl CutRange {
    /// Creates a range, rejecting a zero duration.
    pub fn new(start_secs: u32, duration_secs: u32) -> CoreResult<Self> {
        if duration_secs == 0 {
            return Err(CoreError::InvalidSettings(
                "cut duration must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            start_secs,
            duration_secs,
        })
    }
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Validated settings for a single run.
///
/// Construct through [`SettingsBuilder`] or [`SettingsFile::into_settings`];
/// both paths enforce the same validation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Source video.
    pub input_path: PathBuf,

    /// Path (or bare name on `PATH`) of the ffmpeg binary.
    pub ffmpeg_path: PathBuf,

    /// Optional trim applied before anything else.
    pub cut: Option<CutRange>,

    /// Whether to remux the original audio into the blurred output.
    pub keep_audio: bool,

    /// Optional resize target applied after the cut.
    pub resize: Option<Resolution>,

    /// Detector confidence threshold in `[0, 1]`.
    pub confidence_threshold: f32,

    /// Detector profile: weights, target class, blur style and time estimate.
    pub model: ModelProfile,

    /// Directory holding the ONNX weights named by the profile.
    pub model_dir: PathBuf,

    /// Format the cut start/duration were written in.
    pub time_format: TimeFormat,
}

impl Settings {
    /// Full path of the ONNX weights for the configured model.
    #[must_use]
    pub fn model_weights_path(&self) -> PathBuf {
        self.model_dir.join(self.model.weights_file())
    }
}

/// Checks a confidence threshold lies in `[0, 1]`.
pub(crate) fn validate_threshold(threshold: f32) -> CoreResult<f32> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CoreError::InvalidSettings(format!(
            "confidence threshold {threshold} is outside [0, 1]"
        )));
    }
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_table() {
        assert_eq!("480p".parse::<Resolution>().unwrap().dimensions(), (854, 480));
        assert_eq!("720p".parse::<Resolution>().unwrap().dimensions(), (1280, 720));
        assert_eq!("1080p".parse::<Resolution>().unwrap().dimensions(), (1920, 1080));
    }

    #[test]
    fn test_unsupported_resolution() {
        for token in ["4k", "720", "", "1440p"] {
            match token.parse::<Resolution>() {
                Err(CoreError::UnsupportedResolution(t)) => assert_eq!(t, token),
                other => panic!("expected UnsupportedResolution for {token:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_resolution_label_round_trips_display() {
        for res in Resolution::ALL {
            assert_eq!(res.to_string(), res.label());
        }
    }

    #[test]
    fn test_cut_range_rejects_zero_duration() {
        assert!(CutRange::new(10, 0).is_err());
        assert_eq!(
            CutRange::new(10, 20).unwrap(),
            CutRange {
                start_secs: 10,
                duration_secs: 20
            }
        );
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
        assert!(validate_threshold(-0.1).is_err());
        assert!(validate_threshold(1.5).is_err());
        assert!(validate_threshold(f32::NAN).is_err());
    }
}
