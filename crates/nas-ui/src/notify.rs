//! Transient, stackable user notifications.
//!
//! The center owns the stack; a renderer applies the returned
//! [`NotificationInstruction`]s. Notifications never replace each other and
//! expire after [`AUTO_DISMISS`] unless dismissed first.

use std::time::{Duration, Instant};

use serde::Serialize;

/// How long a notification stays visible.
pub const AUTO_DISMISS: Duration = Duration::from_secs(5);

/// Storage usage at or above which a critical warning is raised.
pub const STORAGE_CRITICAL_PERCENT: u8 = 90;
/// Storage usage at or above which a low-space warning is raised.
pub const STORAGE_LOW_PERCENT: u8 = 75;

/// Severity styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Green confirmation.
    Success,
    /// Red failure.
    Error,
    /// Amber caution.
    Warning,
}

impl NotificationKind {
    /// Lowercase label used by renderers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A notification on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Monotonic identifier.
    pub id: u64,
    /// Styling.
    pub kind: NotificationKind,
    /// Display text.
    pub message: String,
    /// Instant after which the notification is removed.
    pub expires_at: Instant,
}

/// Mutation the renderer must apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationInstruction {
    /// Create the notification container; emitted once, before the first show.
    EnsureContainer,
    /// Append a notification to the stack.
    Show(Notification),
    /// Remove a notification.
    Remove {
        /// Notification to remove.
        id: u64,
    },
}

/// Anything that can surface a notification to the user.
pub trait NotificationSink {
    /// Report `message` with the given styling.
    fn notify(&mut self, kind: NotificationKind, message: &str);
}

/// Stack of visible notifications.
#[derive(Debug)]
pub struct NotificationCenter {
    lifetime: Duration,
    next_id: u64,
    container_ready: bool,
    items: Vec<Notification>,
    pending: Vec<NotificationInstruction>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(AUTO_DISMISS)
    }
}

impl NotificationCenter {
    /// Empty center whose notifications live for `lifetime`.
    #[must_use]
    pub const fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            next_id: 1,
            container_ready: false,
            items: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Push a notification observed at `now`.
    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> Vec<NotificationInstruction> {
        let mut out = Vec::with_capacity(2);
        if !self.container_ready {
            self.container_ready = true;
            out.push(NotificationInstruction::EnsureContainer);
        }
        let notification = Notification {
            id: self.next_id,
            kind,
            message: message.into(),
            expires_at: now + self.lifetime,
        };
        self.next_id += 1;
        self.items.push(notification.clone());
        out.push(NotificationInstruction::Show(notification));
        out
    }

    /// Dismiss a notification. Unknown or already removed ids are ignored.
    pub fn dismiss(&mut self, id: u64) -> Option<NotificationInstruction> {
        let position = self.items.iter().position(|item| item.id == id)?;
        self.items.remove(position);
        Some(NotificationInstruction::Remove { id })
    }

    /// Remove every notification whose lifetime has elapsed by `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<NotificationInstruction> {
        let mut removed = Vec::new();
        self.items.retain(|item| {
            let keep = item.expires_at > now;
            if !keep {
                removed.push(NotificationInstruction::Remove { id: item.id });
            }
            keep
        });
        removed
    }

    /// Notifications currently on the stack, oldest first.
    #[must_use]
    pub fn visible(&self) -> &[Notification] {
        &self.items
    }

    /// Instructions produced through the [`NotificationSink`] impl since the
    /// last call.
    pub fn take_pending(&mut self) -> Vec<NotificationInstruction> {
        std::mem::take(&mut self.pending)
    }
}

impl NotificationSink for NotificationCenter {
    fn notify(&mut self, kind: NotificationKind, message: &str) {
        let instructions = self.push(kind, message, Instant::now());
        self.pending.extend(instructions);
    }
}

/// Low-storage alert raised from a rendered usage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageWarning {
    /// Usage at or above 90%.
    Critical,
    /// Usage at or above 75%.
    Low,
}

impl StorageWarning {
    /// Notification styling for the warning.
    #[must_use]
    pub const fn kind(self) -> NotificationKind {
        match self {
            Self::Critical => NotificationKind::Error,
            Self::Low => NotificationKind::Warning,
        }
    }

    /// Display text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Critical => "Storage space is critically low!",
            Self::Low => "Storage space is running low.",
        }
    }
}

/// Classify a storage usage percentage.
#[must_use]
pub const fn storage_warning(percent: u8) -> Option<StorageWarning> {
    if percent >= STORAGE_CRITICAL_PERCENT {
        Some(StorageWarning::Critical)
    } else if percent >= STORAGE_LOW_PERCENT {
        Some(StorageWarning::Low)
    } else {
        None
    }
}
