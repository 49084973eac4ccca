//! Notification system for the TUI.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "OK",
        }
    }
}

/// Follow-up the footer advertises next to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Retry,
}

impl NotificationAction {
    pub fn hint(&self) -> &'static str {
        match self {
            NotificationAction::Retry => "press r to retry",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub action: Option<NotificationAction>,
    pub created_at: Instant,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: None,
            created_at: Instant::now(),
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Informational notices fade; errors stay until replaced.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.level != NotificationLevel::Error
            && now.saturating_duration_since(self.created_at) >= ttl
    }

    pub fn display(&self) -> String {
        match self.action {
            Some(action) => format!("{}: {} ({})", self.level.label(), self.message, action.hint()),
            None => format!("{}: {}", self.level.label(), self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_action() {
        let note = Notification::new(NotificationLevel::Error, "Refresh failed")
            .with_action(NotificationAction::Retry);
        assert_eq!(note.display(), "ERROR: Refresh failed (press r to retry)");
    }

    #[test]
    fn test_errors_never_expire() {
        let note = Notification::new(NotificationLevel::Error, "boom");
        let later = note.created_at + Duration::from_secs(3600);
        assert!(!note.is_expired(later, Duration::from_secs(5)));

        let info = Notification::new(NotificationLevel::Info, "hello");
        assert!(info.is_expired(info.created_at + Duration::from_secs(6), Duration::from_secs(5)));
    }
}
