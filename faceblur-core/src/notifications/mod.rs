//! Notification system for announcing the end of a run.
//!
//! The orchestrator reports completion or failure through a
//! [`NotificationSender`]. Backends: no-op (default), terminal bell, and
//! ntfy push notifications.
mod abstraction;
mod bell;
mod ntfy;

pub use abstraction::{
    CompositeNotificationSender, NotificationSender, NotificationType, NullNotificationSender,
    send_best_effort,
};
pub use bell::TerminalBellNotifier;
pub use ntfy::NtfyNotificationSender;
