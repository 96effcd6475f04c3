//! Notification bus.
//!
//! Actions push fire-and-forget [`Notification`]s onto the [`Notifications`]
//! queue; the presentation layer drains it.

use roster_states::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// A success/error message pair for one action.
#[derive(Debug, Clone, Copy)]
pub struct NotificationPair {
    pub success: &'static str,
    pub error: &'static str,
}

impl NotificationPair {
    pub fn success(&self) -> Notification {
        Notification::success(self.success)
    }

    pub fn error(&self) -> Notification {
        Notification::error(self.error)
    }
}

pub const LOGIN_NOTIFICATIONS: NotificationPair = NotificationPair {
    success: "Logged in",
    error: "Invalid email or password",
};

pub const REGISTER_NOTIFICATIONS: NotificationPair = NotificationPair {
    success: "Account created",
    error: "Registration failed",
};

pub const SET_ROLE_NOTIFICATIONS: NotificationPair = NotificationPair {
    success: "Updated user role",
    error: "Error updating user role",
};

pub const ACTIVATE_NOTIFICATIONS: NotificationPair = NotificationPair {
    success: "User activated",
    error: "Error activating user",
};

pub const DEACTIVATE_NOTIFICATIONS: NotificationPair = NotificationPair {
    success: "User deactivated",
    error: "Error deactivating user",
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notifications {
    queue: Vec<Notification>,
}

impl State for Notifications {}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        self.queue.push(notification);
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
