use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format_timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    TrackerActivated,
    FirstOpen,
    Reopened,
}

impl NotificationKind {
    /// Kind for an open that brought the stored count to `count`.
    pub fn for_count(count: u32) -> Self {
        if count == 1 {
            NotificationKind::FirstOpen
        } else {
            NotificationKind::Reopened
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::TrackerActivated => "Tracker Activated",
            NotificationKind::FirstOpen => "First Open",
            NotificationKind::Reopened => "Reopened",
        }
    }

    /// ntfy tag, rendered as an emoji by the receiving client.
    pub fn tag(&self) -> &'static str {
        match self {
            NotificationKind::TrackerActivated => "sparkle",
            NotificationKind::FirstOpen => "open_file_folder",
            NotificationKind::Reopened => "arrows_counterclockwise",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpenNotification {
    pub kind: NotificationKind,
    pub recipient: String,
    pub title: String,
    pub ip: String,
    /// Total opens counted so far, 0 for an activation.
    pub count: u32,
    pub opened_at: DateTime<Utc>,
}

impl OpenNotification {
    pub fn headline(&self) -> String {
        format!("{}: {}", self.title, self.kind)
    }

    pub fn message(&self) -> String {
        format!(
            "Recipient: {}\nTime: {}\nIP: {}\nTotal Opens: {}",
            self.recipient,
            format_timestamp(self.opened_at),
            self.ip,
            self.count
        )
    }
}
