//! Styled terminal output.

use std::fmt::Display;

use console::{Term, style};
use roster_business::Notification;

/// Writes styled lines to stdout. Write errors are ignored.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn line(&self, line: &str) {
        drop(self.term.write_line(line));
    }

    pub fn success(&self, message: impl Display) {
        self.line(&format!("{} {message}", style("✓").green().bold()));
    }

    pub fn error(&self, message: impl Display) {
        self.line(&format!("{} {message}", style("✗").red().bold()));
    }

    pub fn info(&self, message: impl Display) {
        self.line(&format!("{} {message}", style("ℹ").blue().bold()));
    }

    pub fn print(&self, message: impl Display) {
        self.line(&message.to_string());
    }

    pub fn header(&self, message: impl Display) {
        self.line(&style(message).bold().cyan().to_string());
    }

    pub fn dim(&self, message: impl Display) {
        self.line(&style(message).dim().to_string());
    }

    pub fn labeled(&self, label: impl Display, value: impl Display) {
        self.line(&format!("  {}: {value}", style(label).dim()));
    }

    /// Print a notification raised by an action.
    pub fn notification(&self, notification: &Notification) {
        if notification.is_error() {
            self.error(&notification.message);
        } else {
            self.success(&notification.message);
        }
    }
}
