// ============================================================================
// faceblur-core/src/config/builder.rs
// ============================================================================
//
// SETTINGS BUILDER: Builder Pattern for Settings
//
// This module provides a fluent API for assembling Settings from loosely
// typed values (strings from a settings file or the command line). All
// validation happens in `build`, so a Settings value that exists is always
// valid: the resolution is supported, the model is known, the threshold is
// in range and the cut times parse.
//
// KEY COMPONENTS:
// - SettingsBuilder: Collects raw values and validates them into Settings
//
// AI-ASSISTANT-INFO: Builder pattern implementation for Settings

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{
    CutRange, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_FFMPEG_PATH, DEFAULT_MODEL_DIR, Resolution,
    Settings, TimeFormat, validate_threshold,
};
use crate::error::{CoreError, CoreResult};
use crate::profile::ModelProfile;

/// Cut request as given, before time parsing.
#[derive(Debug, Clone)]
enum CutRequest {
    Text { start: String, duration: String },
    Secs { start: u32, duration: u32 },
}

/// Builder for creating [`Settings`] instances.
///
/// # Examples
///
/// ```rust
/// use faceblur_core::config::SettingsBuilder;
///
/// let settings = SettingsBuilder::new()
///     .input_path("clip.mp4")
///     .cut("00:10", "00:20")
///     .resolution("720p")
///     .keep_audio(true)
///     .confidence_threshold(0.4)
///     .model("YOLOv8n-face.pt")
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.cut.unwrap().start_secs, 10);
/// ```
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    input_path: Option<PathBuf>,
    ffmpeg_path: PathBuf,
    time_format: TimeFormat,
    cut: Option<CutRequest>,
    keep_audio: bool,
    resolution: Option<String>,
    confidence_threshold: f32,
    model: Option<String>,
    model_dir: PathBuf,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsBuilder {
    /// Creates a builder with default values for every optional field.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input_path: None,
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_PATH),
            time_format: TimeFormat::default(),
            cut: None,
            keep_audio: false,
            resolution: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            model: None,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
        }
    }

    #[must_use]
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// Sets the format used to parse the values given to [`Self::cut`].
    #[must_use]
    pub fn time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    /// Requests a cut, with start and duration in the configured time format.
    #[must_use]
    pub fn cut(mut self, start: impl Into<String>, duration: impl Into<String>) -> Self {
        self.cut = Some(CutRequest::Text {
            start: start.into(),
            duration: duration.into(),
        });
        self
    }

    /// Requests a cut with start and duration already in seconds.
    #[must_use]
    pub fn cut_secs(mut self, start: u32, duration: u32) -> Self {
        self.cut = Some(CutRequest::Secs { start, duration });
        self
    }

    #[must_use]
    pub fn no_cut(mut self) -> Self {
        self.cut = None;
        self
    }

    #[must_use]
    pub fn keep_audio(mut self, keep: bool) -> Self {
        self.keep_audio = keep;
        self
    }

    /// Requests a resize to the given preset token ("480p", "720p", "1080p").
    #[must_use]
    pub fn resolution(mut self, token: impl Into<String>) -> Self {
        self.resolution = Some(token.into());
        self
    }

    #[must_use]
    pub fn no_resize(mut self) -> Self {
        self.resolution = None;
        self
    }

    #[must_use]
    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Sets the model identifier, e.g. `"YOLOv8n-face.pt"`.
    #[must_use]
    pub fn model(mut self, identifier: impl Into<String>) -> Self {
        self.model = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Validates the collected values and produces [`Settings`].
    ///
    /// The model identifier is resolved here, so an unknown model fails
    /// before any media work starts.
    pub fn build(self) -> CoreResult<Settings> {
        let input_path = self
            .input_path
            .ok_or_else(|| CoreError::InvalidSettings("input path is required".to_string()))?;

        let model_id = self
            .model
            .ok_or_else(|| CoreError::InvalidSettings("model identifier is required".to_string()))?;
        let model = ModelProfile::from_identifier(&model_id)?;

        let resize = self
            .resolution
            .as_deref()
            .map(str::parse::<Resolution>)
            .transpose()?;

        let cut = match self.cut {
            None => None,
            Some(CutRequest::Secs { start, duration }) => Some(CutRange::new(start, duration)?),
            Some(CutRequest::Text { start, duration }) => Some(CutRange::new(
                self.time_format.parse_secs(&start)?,
                self.time_format.parse_secs(&duration)?,
            )?),
        };

        let confidence_threshold = validate_threshold(self.confidence_threshold)?;

        Ok(Settings {
            input_path,
            ffmpeg_path: self.ffmpeg_path,
            cut,
            keep_audio: self.keep_audio,
            resize,
            confidence_threshold,
            model,
            model_dir: self.model_dir,
            time_format: self.time_format,
        })
    }
}
