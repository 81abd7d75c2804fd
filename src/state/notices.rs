//! User-facing notifications: a transient status message for successes and
//! a queue of errors shown one at a time in a dialog

use crate::api::Notifier;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a success message stays in the status bar
pub const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(4);

/// Errors beyond this many are dropped, oldest first
const MAX_QUEUED_ERRORS: usize = 8;

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= STATUS_MESSAGE_TTL
    }
}

#[derive(Debug, Default)]
pub struct Notices {
    pub status_message: Option<StatusMessage>,
    errors: VecDeque<String>,
}

impl Notices {
    pub fn push_error(&mut self, message: impl Into<String>) {
        if self.errors.len() == MAX_QUEUED_ERRORS {
            self.errors.pop_front();
        }
        self.errors.push_back(message.into());
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Error currently shown in the dialog
    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Drop the status message once it has been visible long enough
    pub fn tick(&mut self) {
        if self.status_message.as_ref().is_some_and(StatusMessage::is_expired) {
            self.status_message = None;
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_message.as_ref().map(|m| m.text.as_str())
    }
}

impl Notifier for Notices {
    fn notify_success(&mut self, message: &str) {
        self.set_status(message);
    }

    fn notify_error(&mut self, message: &str) {
        self.push_error(message);
    }
}
