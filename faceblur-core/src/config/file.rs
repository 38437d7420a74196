//! TOML settings file.
//!
//! The file mirrors the sectioned key-value layout users already know:
//!
//! ```toml
//! [video]
//! input_path = "clip.mp4"
//! ffmpeg_path = "ffmpeg"
//! cut_video = true
//! start_time = "00:10"
//! duration = "00:20"
//! keep_audio = true
//! resize_video = true
//! resolution = "720p"
//!
//! [blurring]
//! threshold = "0.3"
//!
//! [model]
//! yolo_model = "YOLOv8n-face.pt"
//! ```
//!
//! Loading only checks syntax; semantic validation is shared with
//! [`SettingsBuilder`] so the command line can override keys first.

use super::{Settings, SettingsBuilder, TimeFormat};
use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoSection {
    pub input_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub cut_video: bool,
    pub start_time: Option<String>,
    pub duration: Option<String>,
    pub time_format: Option<String>,
    pub keep_audio: bool,
    pub resize_video: bool,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlurSection {
    /// Decimal string, e.g. `"0.3"`.
    pub threshold: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub yolo_model: Option<String>,
    pub model_dir: Option<PathBuf>,
}

/// Parsed, not yet validated, settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub video: VideoSection,
    #[serde(rename = "blurring")]
    pub blur: BlurSection,
    pub model: ModelSection,
}

impl SettingsFile {
    /// Reads and parses a settings file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::SettingsFile(path.to_path_buf(), e.to_string()))?;
        Self::parse(&text).map_err(|e| match e {
            CoreError::SettingsFile(_, msg) => CoreError::SettingsFile(path.to_path_buf(), msg),
            other => other,
        })
    }

    /// Parses settings from TOML text.
    pub fn parse(text: &str) -> CoreResult<Self> {
        toml::from_str(text).map_err(|e| CoreError::SettingsFile(PathBuf::new(), e.to_string()))
    }

    /// Converts the file into a builder, so callers can apply overrides.
    pub fn into_builder(self) -> CoreResult<SettingsBuilder> {
        let mut builder = SettingsBuilder::new();
        let video = self.video;

        if let Some(path) = video.input_path {
            builder = builder.input_path(path);
        }
        if let Some(path) = video.ffmpeg_path {
            builder = builder.ffmpeg_path(path);
        }
        if let Some(format) = video.time_format.as_deref() {
            builder = builder.time_format(format.parse::<TimeFormat>()?);
        }
        if video.cut_video {
            match (video.start_time, video.duration) {
                (Some(start), Some(duration)) => builder = builder.cut(start, duration),
                _ => {
                    return Err(CoreError::InvalidSettings(
                        "cut_video is set but start_time or duration is missing".to_string(),
                    ));
                }
            }
        }
        builder = builder.keep_audio(video.keep_audio);
        if video.resize_video {
            let token = video.resolution.ok_or_else(|| {
                CoreError::InvalidSettings(
                    "resize_video is set but resolution is missing".to_string(),
                )
            })?;
            builder = builder.resolution(token);
        }

        if let Some(threshold) = self.blur.threshold {
            let value = threshold.trim().parse::<f32>().map_err(|e| {
                CoreError::InvalidSettings(format!("threshold '{threshold}' is not a number: {e}"))
            })?;
            builder = builder.confidence_threshold(value);
        }

        if let Some(model) = self.model.yolo_model {
            builder = builder.model(model);
        }
        if let Some(dir) = self.model.model_dir {
            builder = builder.model_dir(dir);
        }

        Ok(builder)
    }

    /// Validates the file as-is into [`Settings`].
    pub fn into_settings(self) -> CoreResult<Settings> {
        self.into_builder()?.build()
    }
}
