//! Terminal bell notifications.
//!
//! Rings the terminal bell and prints the notification as a single line on
//! the attached terminal.

use crate::error::CoreResult;
use crate::notifications::{NotificationSender, NotificationType};
use console::{Term, style};

/// Notifies the user at the terminal running the tool.
#[derive(Debug, Clone)]
pub struct TerminalBellNotifier {
    term: Term,
}

impl TerminalBellNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self { term: Term::stderr() }
    }

    /// The line printed for `notification`.
    #[must_use]
    pub fn render(notification: &NotificationType) -> String {
        let title = notification.get_title();
        let title = match notification {
            NotificationType::RunError { .. } => style(title).red().bold().to_string(),
            _ => style(title).green().bold().to_string(),
        };
        format!("{}: {}", title, notification.get_message())
    }
}

impl Default for TerminalBellNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSender for TerminalBellNotifier {
    fn send_notification(&self, notification: &NotificationType) -> CoreResult<()> {
        self.term.write_str("\x07")?;
        self.term.write_line(&Self::render(notification))?;
        self.term.flush()?;
        Ok(())
    }
}
