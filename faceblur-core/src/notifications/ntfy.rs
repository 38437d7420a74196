// ============================================================================
// faceblur-core/src/notifications/ntfy.rs
// ============================================================================
//
// NTFY IMPLEMENTATION: Push Notifications Using ntfy
//
// This module sends run notifications to an ntfy topic, which can be received
// on phones and desktops. It uses the blocking ntfy dispatcher, matching the
// single-threaded run.
//
// KEY COMPONENTS:
// - NtfyNotificationSender: Sends notifications to an ntfy topic URL
//
// AI-ASSISTANT-INFO: ntfy implementation for sending notifications

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::notifications::{NotificationSender, NotificationType};

// ---- External crate imports ----
use ntfy::DispatcherBuilder;
use ntfy::payload::{Payload, Priority as NtfyPriority};

// ============================================================================
// NTFY NOTIFICATION SENDER
// ============================================================================

/// Sends notifications to an ntfy server.
///
/// # Examples
///
/// ```rust,no_run
/// use faceblur_core::notifications::{NotificationSender, NotificationType, NtfyNotificationSender};
/// use std::path::PathBuf;
///
/// let sender = NtfyNotificationSender::new("https://ntfy.sh/your_topic").unwrap();
/// let notification = NotificationType::RunError {
///     input_path: PathBuf::from("/path/to/clip.mp4"),
///     message: "ffmpeg not found".to_string(),
/// };
/// sender.send_notification(&notification).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct NtfyNotificationSender {
    base_url: String,
    topic: String,
}

impl NtfyNotificationSender {
    /// Creates a sender for a full topic URL such as `https://ntfy.sh/my_topic`.
    ///
    /// The URL must use https and name both a host and a topic.
    pub fn new(topic_url: &str) -> CoreResult<Self> {
        let Some(after_scheme) = topic_url.strip_prefix("https://") else {
            return Err(CoreError::NotificationError(format!(
                "Invalid ntfy topic URL '{topic_url}': must start with https://"
            )));
        };

        let (host, topic) = after_scheme.split_once('/').unwrap_or((after_scheme, ""));
        if host.is_empty() {
            return Err(CoreError::NotificationError(format!(
                "URL '{topic_url}' must have a non-empty host"
            )));
        }
        let topic = topic.trim_end_matches('/');
        if topic.is_empty() {
            return Err(CoreError::NotificationError(format!(
                "URL '{topic_url}' is missing topic path"
            )));
        }

        Ok(Self {
            base_url: format!("https://{host}"),
            topic: topic.to_string(),
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl NotificationSender for NtfyNotificationSender {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()> {
        let dispatcher = DispatcherBuilder::new(&self.base_url)
            .build_blocking()
            .map_err(|e| {
                CoreError::NotificationError(format!(
                    "Failed to build ntfy dispatcher for {}: {}",
                    self.base_url, e
                ))
            })?;

        let priority = map_priority(notification.get_priority()).unwrap_or_else(|| {
            log::warn!(
                "Invalid ntfy priority value provided: {}",
                notification.get_priority()
            );
            NtfyPriority::Default
        });

        let mut tags = vec!["faceblur".to_string()];
        match notification {
            NotificationType::RunComplete { .. } => tags.push("complete".to_string()),
            NotificationType::RunError { .. } => tags.push("error".to_string()),
            NotificationType::Custom { .. } => {}
        }

        let payload = Payload::new(self.topic.as_str())
            .message(notification.get_message())
            .title(notification.get_title())
            .priority(priority)
            .tags(tags);

        dispatcher.send(&payload).map_err(|e| {
            CoreError::NotificationError(format!(
                "Failed to send ntfy notification to {}/{}: {}",
                self.base_url, self.topic, e
            ))
        })?;
        log::debug!("Sent ntfy notification to topic {}", self.topic);
        Ok(())
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Maps a numeric priority (1-5) to the ntfy priority levels.
fn map_priority(p: u8) -> Option<NtfyPriority> {
    match p {
        1 => Some(NtfyPriority::Min),
        2 => Some(NtfyPriority::Low),
        3 => Some(NtfyPriority::Default),
        4 => Some(NtfyPriority::High),
        5 => Some(NtfyPriority::Max),
        _ => None,
    }
}
