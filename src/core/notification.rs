//! Toast notification types shared by the fetch boundary and the UI
//!
//! The boundary code only knows about the [`Notify`] trait; the UI provides
//! the reactive implementation that renders toasts.

use serde::{Deserialize, Serialize};

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    Success,
    Error,
    Warning,
    Info,
}

/// A single toast notification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub auto_dismiss_ms: Option<u32>,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            notification_type: NotificationType::Success,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: Some(3000),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            notification_type: NotificationType::Error,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: None, // Errors should be manually dismissed
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            notification_type: NotificationType::Warning,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: Some(5000),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            notification_type: NotificationType::Info,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: Some(3000),
        }
    }

    pub fn is_error(&self) -> bool {
        self.notification_type == NotificationType::Error
    }
}

/// Sink for user-visible notifications
pub trait Notify {
    fn notify(&self, notification: Notification);
}

impl<N: Notify + ?Sized> Notify for &N {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_not_auto_dismissed() {
        assert_eq!(Notification::error("a", "b").auto_dismiss_ms, None);
        assert!(Notification::error("a", "b").is_error());
    }

    #[test]
    fn test_non_errors_auto_dismiss() {
        assert_eq!(Notification::success("a", "b").auto_dismiss_ms, Some(3000));
        assert_eq!(Notification::warning("a", "b").auto_dismiss_ms, Some(5000));
        assert_eq!(Notification::info("a", "b").auto_dismiss_ms, Some(3000));
    }
}
