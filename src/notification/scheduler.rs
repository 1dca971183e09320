//! Derive local notifications from tasks

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Utc};

use crate::config::{self, DAILY_DIGEST_TIME, EVENING_REMINDER_TIME, NOTIFICATION_PERMISSION_KEY};
use crate::error::SyncError;
use crate::notification::{NotificationRequest, ReminderOffset, Trigger};
use crate::task::{Task, TaskId};
use crate::traits::{KeyValueStore, NotificationCenter};

const TASK_REMINDER_PREFIX: &str = "task-reminder";
/// Identifier of the morning summary
pub const DAILY_DIGEST_ID: &str = "daily-digest";
/// Identifier of the evening reminder
pub const EVENING_REMINDER_ID: &str = "evening-reminder";

/// The identifier of the reminder of `task_id` that fires `offset` before its due date
pub fn reminder_id(offset: ReminderOffset, task_id: &TaskId) -> String {
    format!("{}-{}-{}", TASK_REMINDER_PREFIX, offset.label(), task_id)
}


/// Schedules and cancels the local notifications of tasks
#[derive(Debug)]
pub struct NotificationScheduler<S: KeyValueStore, N: NotificationCenter> {
    settings: Arc<S>,
    center: N,
}

impl<S: KeyValueStore, N: NotificationCenter> NotificationScheduler<S, N> {
    pub fn new(settings: Arc<S>, center: N) -> Self {
        Self { settings, center }
    }

    /// Returns the underlying notification center
    pub fn center(&self) -> &N {
        &self.center
    }

    /// Ask the user for the permission to notify them.
    ///
    /// The user is prompted only once. Later calls return the current authorization
    pub async fn request_authorization(&self) -> Result<bool, SyncError> {
        if self.settings.get_bool(NOTIFICATION_PERMISSION_KEY) {
            return Ok(self.center.is_authorized().await);
        }

        let granted = self.center.request_authorization().await.map_err(SyncError::platform)?;
        if let Err(err) = self.settings.set_bool(NOTIFICATION_PERMISSION_KEY, true) {
            log::warn!("Unable to remember that notification permission was requested: {}", err);
        }
        log::info!("Notification permission {}", if granted { "granted" } else { "denied" });
        Ok(granted)
    }

    /// Schedule the reminders of a task.
    ///
    /// Nothing is scheduled for tasks that are completed or have no due date.
    /// Reminders that would fire in the past are skipped. \
    /// A reminder the center refuses does not prevent the other one from being scheduled; the first error is returned once both have been tried.
    pub async fn schedule(&self, task: &Task) -> Result<usize, SyncError> {
        self.schedule_at(task, Utc::now()).await
    }

    async fn schedule_at(&self, task: &Task, now: DateTime<Utc>) -> Result<usize, SyncError> {
        let due = match task.due_date() {
            None => return Ok(0),
            Some(due) => *due,
        };
        if task.completed() {
            return Ok(0);
        }

        let mut scheduled = 0;
        let mut first_error = None;
        for offset in ReminderOffset::ALL.iter() {
            let fire_at = due - offset.duration();
            if fire_at <= now {
                log::debug!("Skipping the {} reminder of task {}: it would fire in the past", offset.label(), task.id());
                continue;
            }

            let request = NotificationRequest::new(
                reminder_id(*offset, task.id()),
                reminder_title(*offset),
                task.title(),
                Trigger::At(fire_at),
            );
            match self.center.add(request).await {
                Ok(()) => scheduled += 1,
                Err(err) => {
                    log::warn!("Unable to schedule the {} reminder of task {}: {}", offset.label(), task.id(), err);
                    if first_error.is_none() {
                        first_error = Some(SyncError::platform(err));
                    }
                },
            }
        }

        log::debug!("Scheduled {} reminder(s) for task {}", scheduled, task.id());
        match first_error {
            Some(err) => Err(err),
            None => Ok(scheduled),
        }
    }

    /// Cancel every reminder of a task. Cancelling reminders that do not exist is fine
    pub async fn cancel(&self, task_id: &TaskId) {
        let identifiers: Vec<String> = ReminderOffset::ALL.iter()
            .map(|offset| reminder_id(*offset, task_id))
            .collect();
        self.center.remove_pending(&identifiers).await;
    }

    /// Cancel then schedule again the reminders of a task
    pub async fn reschedule(&self, task: &Task) -> Result<usize, SyncError> {
        self.cancel(task.id()).await;
        self.schedule(task).await
    }

    /// (Re)schedule the morning summary, with a text computed from `tasks`
    pub async fn schedule_daily_digest(&self, tasks: &[Task]) -> Result<(), SyncError> {
        let body = daily_digest_body(tasks, Utc::now());
        let request = NotificationRequest::new(
            DAILY_DIGEST_ID.to_string(),
            "Daily Summary",
            body,
            Trigger::Daily(config::read(&DAILY_DIGEST_TIME)),
        );
        self.center.remove_pending(&[DAILY_DIGEST_ID.to_string()]).await;
        self.center.add(request).await.map_err(SyncError::platform)
    }

    /// (Re)schedule the evening reminder, with a text computed from `tasks`
    pub async fn schedule_evening_reminder(&self, tasks: &[Task]) -> Result<(), SyncError> {
        let body = evening_reminder_body(tasks, Utc::now());
        let request = NotificationRequest::new(
            EVENING_REMINDER_ID.to_string(),
            "Evening Check-in",
            body,
            Trigger::Daily(config::read(&EVENING_REMINDER_TIME)),
        );
        self.center.remove_pending(&[EVENING_REMINDER_ID.to_string()]).await;
        self.center.add(request).await.map_err(SyncError::platform)
    }

    /// Remove both digests
    pub async fn cancel_digests(&self) {
        self.center.remove_pending(&[DAILY_DIGEST_ID.to_string(), EVENING_REMINDER_ID.to_string()]).await;
    }
}


fn reminder_title(offset: ReminderOffset) -> &'static str {
    match offset {
        ReminderOffset::DayBefore => "Task Due Tomorrow",
        ReminderOffset::HourBefore => "Task Due in 1 Hour",
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Text of the morning summary
pub fn daily_digest_body(tasks: &[Task], now: DateTime<Utc>) -> String {
    let today = now.with_timezone(&Local).date_naive();
    let pending: Vec<&Task> = tasks.iter().filter(|t| !t.completed()).collect();
    let due_today = pending.iter().filter(|t| t.is_due_on(today)).count();
    let overdue = pending.iter().filter(|t| t.is_overdue(now) && !t.is_due_on(today)).count();

    if pending.is_empty() {
        return "You're all caught up. No pending tasks!".to_string();
    }

    let mut body = if due_today > 0 {
        format!("You have {} due today and {} pending in total.", plural(due_today, "task"), pending.len())
    } else {
        format!("You have {} pending.", plural(pending.len(), "task"))
    };
    if overdue > 0 {
        body.push_str(&format!(" {} overdue.", plural(overdue, "task")));
    }
    body
}

/// Text of the evening reminder
pub fn evening_reminder_body(tasks: &[Task], now: DateTime<Utc>) -> String {
    let tomorrow = (now + Duration::days(1)).with_timezone(&Local).date_naive();
    let due_tomorrow = tasks.iter()
        .filter(|t| !t.completed() && t.is_due_on(tomorrow))
        .count();

    if due_tomorrow == 0 {
        "Nothing is due tomorrow. Enjoy your evening!".to_string()
    } else {
        format!("{} due tomorrow. A little progress tonight goes a long way!", plural(due_tomorrow, "task"))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::notification::memory_center::CenterCall;
    use crate::mock_behaviour::MockBehaviour;
    use crate::notification::MemoryNotificationCenter;
    use crate::settings::MemoryStore;

    fn scheduler() -> NotificationScheduler<MemoryStore, MemoryNotificationCenter> {
        NotificationScheduler::new(Arc::new(MemoryStore::new()), MemoryNotificationCenter::new())
    }

    #[tokio::test]
    async fn no_due_date_no_reminder() {
        let scheduler = scheduler();
        let task = Task::new("Buy a lab coat");
        assert_eq!(scheduler.schedule(&task).await.unwrap(), 0);
        assert!(scheduler.center().pending().await.is_empty());
    }

    #[tokio::test]
    async fn both_reminders_for_distant_due_date() {
        let scheduler = scheduler();
        let due = Utc::now() + Duration::hours(30);
        let task = Task::new("Essay").with_due_date(due);
        assert_eq!(scheduler.schedule(&task).await.unwrap(), 2);

        let day_before = scheduler.center().pending_request(&reminder_id(ReminderOffset::DayBefore, task.id())).unwrap();
        assert_eq!(day_before.trigger, Trigger::At(due - Duration::hours(24)));
        assert_eq!(day_before.body, "Essay");
        let hour_before = scheduler.center().pending_request(&reminder_id(ReminderOffset::HourBefore, task.id())).unwrap();
        assert_eq!(hour_before.trigger, Trigger::At(due - Duration::hours(1)));
    }

    #[tokio::test]
    async fn past_candidates_are_skipped() {
        let scheduler = scheduler();
        let task = Task::new("Quiz").with_due_date(Utc::now() + Duration::hours(2));
        assert_eq!(scheduler.schedule(&task).await.unwrap(), 1);
        assert!(scheduler.center().pending_request(&reminder_id(ReminderOffset::HourBefore, task.id())).is_some());
        assert!(scheduler.center().pending_request(&reminder_id(ReminderOffset::DayBefore, task.id())).is_none());

        let late = Task::new("Too late").with_due_date(Utc::now() + Duration::minutes(30));
        assert_eq!(scheduler.schedule(&late).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn one_refused_reminder_does_not_prevent_the_other() {
        let scheduler = scheduler();
        scheduler.center().set_mock_behaviour(MockBehaviour {
            add_notification_behaviour: (0, 1),
            ..MockBehaviour::default()
        });
        let task = Task::new("Essay").with_due_date(Utc::now() + Duration::hours(30));

        assert!(matches!(scheduler.schedule(&task).await, Err(SyncError::Platform(_))));
        assert!(scheduler.center().pending_request(&reminder_id(ReminderOffset::DayBefore, task.id())).is_none());
        assert!(scheduler.center().pending_request(&reminder_id(ReminderOffset::HourBefore, task.id())).is_some());
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let scheduler = scheduler();
        let task = Task::new("Essay").with_due_date(Utc::now() + Duration::hours(30));
        scheduler.schedule(&task).await.unwrap();

        scheduler.cancel(task.id()).await;
        scheduler.cancel(task.id()).await;
        assert!(scheduler.center().pending().await.is_empty());

        let expected_ids = vec![
            reminder_id(ReminderOffset::DayBefore, task.id()),
            reminder_id(ReminderOffset::HourBefore, task.id()),
        ];
        let removals = scheduler.center().history().into_iter()
            .filter(|call| *call == CenterCall::Removed(expected_ids.clone()))
            .count();
        assert_eq!(removals, 2);
    }

    #[tokio::test]
    async fn permission_is_requested_once() {
        let settings = Arc::new(MemoryStore::new());
        let center = MemoryNotificationCenter::new();
        center.set_mock_behaviour(crate::mock_behaviour::MockBehaviour {
            request_authorization_behaviour: (1, 1),
            ..Default::default()
        });
        let scheduler = NotificationScheduler::new(Arc::clone(&settings), center);

        assert!(scheduler.request_authorization().await.unwrap());
        assert!(settings.get_bool(NOTIFICATION_PERMISSION_KEY));
        // A second prompt would fail, but the center is not asked again
        assert!(scheduler.request_authorization().await.unwrap());
    }

    #[tokio::test]
    async fn digests_are_replaced() {
        let scheduler = scheduler();
        scheduler.schedule_daily_digest(&[]).await.unwrap();
        let tasks = vec![Task::new("Essay"), Task::new("Reading")];
        scheduler.schedule_daily_digest(&tasks).await.unwrap();
        scheduler.schedule_evening_reminder(&tasks).await.unwrap();

        let pending = scheduler.center().pending().await;
        assert_eq!(pending.len(), 2);
        let digest = scheduler.center().pending_request(DAILY_DIGEST_ID).unwrap();
        assert_eq!(digest.body, "You have 2 tasks pending.");
        assert!(matches!(digest.trigger, Trigger::Daily(_)));
        assert!(scheduler.center().pending_request(EVENING_REMINDER_ID).is_some());

        scheduler.cancel_digests().await;
        assert!(scheduler.center().pending().await.is_empty());
    }

    #[test]
    fn digest_texts() {
        let now = Utc::now();
        assert_eq!(daily_digest_body(&[], now), "You're all caught up. No pending tasks!");

        let mut done = Task::new("Done");
        done.set_completed(true);
        let today = Task::new("Today").with_due_date(now);
        let later = Task::new("Later").with_due_date(now + Duration::days(10));
        let tasks = vec![done, today, later];
        assert_eq!(daily_digest_body(&tasks, now), "You have 1 task due today and 2 pending in total.");

        let overdue = Task::new("Late").with_due_date(now - Duration::days(3));
        assert_eq!(daily_digest_body(&[overdue], now), "You have 1 task pending. 1 task overdue.");

        assert_eq!(evening_reminder_body(&tasks, now), "Nothing is due tomorrow. Enjoy your evening!");
        let tomorrow = Task::new("Tomorrow").with_due_date(now + Duration::days(1));
        assert_eq!(evening_reminder_body(&[tomorrow], now), "1 task due tomorrow. A little progress tonight goes a long way!");
    }
}
