//! Core library for redacting faces and heads in video.
//!
//! A run optionally trims and rescales the source with ffmpeg, streams every
//! frame through a YOLO detector, blurs the union of the boxes found over the
//! last three frames, and optionally restores the original audio.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use faceblur_core::external::SidecarSpawner;
//! use faceblur_core::notifications::NullNotificationSender;
//! use faceblur_core::progress_reporting::LogProgressReporter;
//! use faceblur_core::{OnnxYoloDetector, RunHooks, SettingsBuilder, process_video};
//!
//! let settings = SettingsBuilder::new()
//!     .input_path("/videos/clip.mp4")
//!     .cut("00:10", "00:20")
//!     .resolution("720p")
//!     .keep_audio(true)
//!     .model("YOLOv8n-face.pt")
//!     .build()
//!     .unwrap();
//!
//! let detector =
//!     OnnxYoloDetector::load(&settings.model_weights_path(), settings.model.target_class()).unwrap();
//! let mut confirm = |_: &faceblur_core::ProcessingEstimate| true;
//!
//! let result = process_video(
//!     &settings,
//!     &SidecarSpawner,
//!     detector,
//!     RunHooks {
//!         progress: &LogProgressReporter::default(),
//!         confirm: &mut confirm,
//!         notifier: &NullNotificationSender,
//!     },
//! )
//! .unwrap();
//! println!("Wrote {}", result.final_output().display());
//! ```

pub mod blur;
pub mod buffer;
pub mod config;
pub mod detection;
pub mod error;
pub mod external;
pub mod logging;
pub mod notifications;
pub mod pipeline;
pub mod processing;
pub mod profile;
pub mod progress_reporting;
pub mod temp_files;
pub mod terminal_output;
pub mod utils;

// Re-exports for public API
pub use blur::RegionBlurrer;
pub use buffer::TemporalBoxBuffer;
pub use config::{CutRange, Resolution, Settings, SettingsBuilder, SettingsFile, TimeFormat};
pub use detection::{DetectionBox, Detector, OnnxYoloDetector};
pub use error::{CoreError, CoreResult};
pub use external::{MediaTool, StreamInfo};
pub use pipeline::{FrameProcessingPipeline, PipelineState, PipelineSummary, ProcessingEstimate};
pub use processing::{RunHooks, RunResult, process_video};
pub use profile::{BlurStyle, ModelProfile};
pub use utils::{format_bytes, format_duration, format_estimate};
