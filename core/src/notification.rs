//! Transient user-facing notifications.
//!
//! At most one notification is active. It expires five seconds after it was
//! shown, can be dismissed earlier, and is replaced outright by the next one.
//! Expiry is a stored deadline rather than a scheduled callback, so there is
//! nothing to cancel when the owner goes away.

use std::time::{Duration, Instant};

pub const AUTO_DISMISS: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    active: Option<Notification>,
    lifetime: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_lifetime(AUTO_DISMISS)
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            active: None,
            lifetime,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(message, severity, Instant::now());
    }

    /// Show `message` as if it appeared at `now`, replacing any active one.
    pub fn show_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        let message = message.into();
        tracing::debug!(severity = severity.as_str(), %message, "notification");
        self.active = Some(Notification {
            message,
            severity,
            shown_at: now,
            expires_at: now + self.lifetime,
        });
    }

    /// Close the active notification, if any.
    pub fn dismiss(&mut self) -> Option<Notification> {
        self.active.take()
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current_at(Instant::now())
    }

    /// The notification visible at `now`.
    pub fn current_at(&self, now: Instant) -> Option<&Notification> {
        self.active.as_ref().filter(|n| now < n.expires_at)
    }

    /// Drop the active notification once its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Option<Notification> {
        match &self.active {
            Some(n) if now >= n.expires_at => self.active.take(),
            _ => None,
        }
    }
}
