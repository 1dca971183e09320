//! Calendar events that mirror tasks

pub mod sync;
pub mod memory_store;

pub use sync::CalendarSync;
pub use memory_store::MemoryEventStore;

use chrono::{DateTime, Duration, Utc};

use crate::notification::ReminderOffset;
use crate::task::Task;

/// How long the event of a task lasts
pub fn event_duration() -> Duration {
    Duration::hours(1)
}

/// The editable content of a calendar event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDetails {
    pub title: String,
    pub notes: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Alarms, as durations before `start`
    pub alarms: Vec<Duration>,
}

impl EventDetails {
    /// The event that mirrors a task. Returns `None` if the task has no due date
    pub fn from_task(task: &Task) -> Option<Self> {
        let start = *task.due_date()?;
        Some(Self {
            title: task.title().to_string(),
            notes: task.description().map(|d| d.to_string()),
            start,
            end: start + event_duration(),
            alarms: ReminderOffset::ALL.iter().map(|offset| offset.duration()).collect(),
        })
    }
}

/// An event, as stored in an [`EventStore`](crate::traits::EventStore)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarEvent {
    identifier: String,
    details: EventDetails,
}

impl CalendarEvent {
    pub fn new(identifier: String, details: EventDetails) -> Self {
        Self { identifier, details }
    }

    pub fn identifier(&self) -> &str { &self.identifier }
    pub fn details(&self) -> &EventDetails { &self.details }
}
