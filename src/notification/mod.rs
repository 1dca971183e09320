//! Local notifications: due-date reminders and daily digests

pub mod scheduler;
pub mod memory_center;

pub use scheduler::NotificationScheduler;
pub use memory_center::MemoryNotificationCenter;

use chrono::{DateTime, Duration, NaiveTime, Utc};


/// How long before a due date a reminder fires.
///
/// Calendar events of linked tasks carry alarms at the same offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReminderOffset {
    DayBefore,
    HourBefore,
}

impl ReminderOffset {
    pub const ALL: [ReminderOffset; 2] = [ReminderOffset::DayBefore, ReminderOffset::HourBefore];

    pub fn duration(&self) -> Duration {
        match self {
            ReminderOffset::DayBefore => Duration::hours(24),
            ReminderOffset::HourBefore => Duration::hours(1),
        }
    }

    /// Short label, used in notification identifiers
    pub fn label(&self) -> &'static str {
        match self {
            ReminderOffset::DayBefore => "24h",
            ReminderOffset::HourBefore => "1h",
        }
    }
}


/// When a notification fires
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Once, at this instant
    At(DateTime<Utc>),
    /// Every day, at this local time
    Daily(NaiveTime),
}

/// A local notification waiting to be delivered
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
}

impl NotificationRequest {
    pub fn new<S: ToString, T: ToString>(identifier: String, title: S, body: T, trigger: Trigger) -> Self {
        Self {
            identifier,
            title: title.to_string(),
            body: body.to_string(),
            trigger,
        }
    }
}
