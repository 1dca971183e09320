//! Support for library configuration options

use std::sync::{Arc, Mutex};

use chrono::NaiveTime;
use once_cell::sync::Lazy;

/// Part of the ProdID string that describes the organization (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static ORG_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("My university".to_string())));

/// Part of the ProdID string that describes the product name (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("CampusPlanner".to_string())));

/// Local time at which the daily summary notification fires.
pub static DAILY_DIGEST_TIME: Lazy<Arc<Mutex<NaiveTime>>> = Lazy::new(|| Arc::new(Mutex::new(o_clock(8))));

/// Local time at which the evening reminder fires.
pub static EVENING_REMINDER_TIME: Lazy<Arc<Mutex<NaiveTime>>> = Lazy::new(|| Arc::new(Mutex::new(o_clock(20))));

fn o_clock(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default()
}

/// Settings key of the encoded task list
pub const TASKS_KEY: &str = "tasks";
/// Settings key of the task → calendar event mapping
pub const CALENDAR_LINKS_KEY: &str = "calendar_event_links";
/// Settings key of the "notification permission already requested" flag
pub const NOTIFICATION_PERMISSION_KEY: &str = "notification_permission_requested";
/// Settings key of the grade book
pub const GRADES_KEY: &str = "grades";

/// Read one of the overridable values of this module, even if a previous writer panicked
pub fn read<T: Clone>(value: &Lazy<Arc<Mutex<T>>>) -> T {
    match value.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
