// ============================================================================
// faceblur-core/src/notifications/abstraction.rs
// ============================================================================
//
// NOTIFICATION ABSTRACTION: Notification System Abstractions
//
// This module lets the run orchestrator announce the end of a run without
// knowing how the announcement is delivered. It defines the notification
// types and the trait every backend implements.
//
// KEY COMPONENTS:
// - NotificationType: Enum of different notification types
// - NotificationSender: Trait for sending notifications
// - NullNotificationSender: No-op implementation, the default
//
// AI-ASSISTANT-INFO: Notification system abstractions

// ---- Internal crate imports ----
use crate::error::CoreResult;

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// NOTIFICATION TYPES
// ============================================================================

/// Represents different types of notifications that can be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationType {
    /// A run finished and produced its outputs
    RunComplete {
        /// Path to the source video
        input_path: PathBuf,
        /// Final output (the audio remux when one was made)
        output_path: PathBuf,
        /// Frames processed by the pipeline
        frame_count: u64,
        /// Wall-clock time of the whole run
        duration: Duration,
    },

    /// A run stopped with an error
    RunError {
        /// Path to the source video
        input_path: PathBuf,
        /// Error message
        message: String,
    },

    /// A custom notification message
    Custom {
        title: String,
        message: String,
        /// Priority level (1-5, with 5 being highest)
        priority: u8,
    },
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn human_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

impl NotificationType {
    /// Gets the title for this notification type.
    #[must_use]
    pub fn get_title(&self) -> String {
        match self {
            NotificationType::RunComplete { .. } => "Blurring Complete".to_string(),
            NotificationType::RunError { .. } => "Blurring Failed".to_string(),
            NotificationType::Custom { title, .. } => title.clone(),
        }
    }

    /// Gets the message body for this notification type.
    #[must_use]
    pub fn get_message(&self) -> String {
        match self {
            NotificationType::RunComplete {
                input_path,
                output_path,
                frame_count,
                duration,
            } => format!(
                "Blurred {} ({} frames) in {}. Output: {}",
                display_name(input_path),
                frame_count,
                human_duration(*duration),
                display_name(output_path)
            ),
            NotificationType::RunError { input_path, message } => {
                format!("Error blurring {}: {}", display_name(input_path), message)
            }
            NotificationType::Custom { message, .. } => message.clone(),
        }
    }

    /// Gets the priority level for this notification type (1-5).
    #[must_use]
    pub fn get_priority(&self) -> u8 {
        match self {
            NotificationType::RunComplete { .. } => 4,
            NotificationType::RunError { .. } => 5,
            NotificationType::Custom { priority, .. } => *priority,
        }
    }
}

// ============================================================================
// NOTIFICATION SENDER
// ============================================================================

/// Delivers notifications to some backend.
pub trait NotificationSender {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()>;
}

/// Sends `notification`, logging a failure instead of returning it.
pub fn send_best_effort(sender: &dyn NotificationSender, notification: &NotificationType) {
    if let Err(e) = sender.send_notification(notification) {
        log::warn!("Failed to send notification '{}': {}", notification.get_title(), e);
    }
}

/// No-op implementation of NotificationSender.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotificationSender;

impl NotificationSender for NullNotificationSender {
    fn send_notification(&self, _notification: &NotificationType) -> CoreResult<()> {
        Ok(())
    }
}

/// Sends every notification to each of the wrapped senders in turn.
#[derive(Default)]
pub struct CompositeNotificationSender {
    senders: Vec<Box<dyn NotificationSender>>,
}

impl CompositeNotificationSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Box<dyn NotificationSender>) {
        self.senders.push(sender);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl NotificationSender for CompositeNotificationSender {
    /// Every sender is tried; the first error is returned.
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()> {
        let mut first_error = None;
        for sender in &self.senders {
            if let Err(e) = sender.send_notification(notification) {
                log::debug!("Notification backend failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
