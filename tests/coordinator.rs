use std::sync::Arc;

use chrono::{Duration, Utc};

use campus_planner::calendar::memory_store::StoreCall;
use campus_planner::calendar::MemoryEventStore;
use campus_planner::mock_behaviour::MockBehaviour;
use campus_planner::notification::memory_center::CenterCall;
use campus_planner::notification::scheduler::{reminder_id, DAILY_DIGEST_ID, EVENING_REMINDER_ID};
use campus_planner::notification::{MemoryNotificationCenter, ReminderOffset};
use campus_planner::settings::{FileStore, MemoryStore};
use campus_planner::traits::NotificationCenter;
use campus_planner::{Category, Task, TaskCoordinator};

type TestCoordinator = TaskCoordinator<MemoryStore, MemoryEventStore, MemoryNotificationCenter>;

fn new_coordinator() -> TestCoordinator {
    let _ = env_logger::builder().is_test(true).try_init();
    TaskCoordinator::new(Arc::new(MemoryStore::new()), MemoryEventStore::new(), MemoryNotificationCenter::new())
}

fn due_in(title: &str, hours: i64) -> Task {
    Task::new(title).with_due_date(Utc::now() + Duration::hours(hours))
}

async fn pending_ids(coordinator: &TestCoordinator) -> Vec<String> {
    coordinator.notifications().center().pending().await
        .into_iter()
        .map(|request| request.identifier)
        .collect()
}


#[tokio::test]
async fn test_added_task_is_persisted() {
    let mut coordinator = new_coordinator();
    let task = Task::new("Read chapter 3").with_category(Category::Reading);
    let id = task.id().clone();

    assert!(coordinator.add(task).await.is_success());

    let stored = coordinator.task_store().load();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id(), &id);
    assert_eq!(stored[0].title(), "Read chapter 3");
    assert_eq!(stored[0].category(), Category::Reading);
}

#[tokio::test]
async fn test_duplicate_task_is_rejected() {
    let mut coordinator = new_coordinator();
    let task = Task::new("Lab report");

    assert!(coordinator.add(task.clone()).await.is_success());
    let completion = coordinator.add(task.clone()).await;
    assert!(!completion.is_success());
    assert_eq!(completion.error(), Some(format!("a task with id {} already exists", task.id()).as_str()));
    assert_eq!(coordinator.tasks().len(), 1);
}

#[tokio::test]
async fn test_task_without_due_date() {
    let mut coordinator = new_coordinator();
    let task = Task::new("Someday");
    let id = task.id().clone();

    assert!(coordinator.add(task).await.is_success());
    assert!(pending_ids(&coordinator).await.is_empty());

    let completion = coordinator.link_to_calendar(&id).await;
    assert_eq!(completion.error(), Some(format!("task {} has no due date", id).as_str()));
    assert!(coordinator.calendar().store().history().is_empty());
    assert_eq!(coordinator.task(&id).unwrap().calendar_linked(), false);
}

#[tokio::test]
async fn test_delete_removes_exactly_one_task() {
    let mut coordinator = new_coordinator();
    let kept = due_in("Kept", 30);
    let deleted = due_in("Deleted", 30);
    let deleted_id = deleted.id().clone();
    coordinator.add(kept.clone()).await;
    coordinator.add(deleted).await;
    assert!(coordinator.link_to_calendar(&deleted_id).await.is_success());

    assert!(coordinator.delete(&deleted_id).await.is_success());

    let remaining = coordinator.tasks();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), kept.id());
    assert!(coordinator.calendar().store().is_empty());
    assert!(!coordinator.calendar().is_linked(&deleted_id));
    assert_eq!(
        pending_ids(&coordinator).await,
        // sorted by identifier
        vec![reminder_id(ReminderOffset::HourBefore, kept.id()), reminder_id(ReminderOffset::DayBefore, kept.id())],
    );

    let completion = coordinator.delete(&deleted_id).await;
    assert_eq!(completion.error(), Some(format!("task {} not found", deleted_id).as_str()));
    assert_eq!(coordinator.tasks().len(), 1);
}

#[tokio::test]
async fn test_unknown_task_is_not_updated() {
    let mut coordinator = new_coordinator();
    let completion = coordinator.update(Task::new("Ghost")).await;
    assert!(!completion.is_success());
    assert!(coordinator.tasks().is_empty());
    assert!(coordinator.notifications().center().history().is_empty());
}

#[tokio::test]
async fn test_completion_cancels_reminders() {
    let mut coordinator = new_coordinator();
    let task = due_in("Essay", 30);
    let id = task.id().clone();
    coordinator.add(task).await;
    assert_eq!(pending_ids(&coordinator).await.len(), 2);

    assert!(coordinator.complete(&id).await.is_success());
    assert!(coordinator.task(&id).unwrap().completed());
    assert!(pending_ids(&coordinator).await.is_empty());

    // Cancelling again is harmless
    coordinator.notifications().cancel(&id).await;
    assert!(pending_ids(&coordinator).await.is_empty());
}

#[tokio::test]
async fn test_renaming_reschedules_reminders_only() {
    let mut coordinator = new_coordinator();
    let task = due_in("A", 2);
    let id = task.id().clone();
    coordinator.add(task.clone()).await;
    // The reminder one day before would fire in the past
    assert_eq!(pending_ids(&coordinator).await, vec![reminder_id(ReminderOffset::HourBefore, &id)]);
    coordinator.notifications().center().clear_history();

    let mut renamed = task.clone();
    renamed.set_title("B".to_string());
    assert!(coordinator.update(renamed).await.is_success());

    assert_eq!(
        coordinator.notifications().center().history(),
        vec![
            CenterCall::Removed(vec![reminder_id(ReminderOffset::DayBefore, &id), reminder_id(ReminderOffset::HourBefore, &id)]),
            CenterCall::Added(reminder_id(ReminderOffset::HourBefore, &id)),
        ],
    );
    let request = coordinator.notifications().center().pending_request(&reminder_id(ReminderOffset::HourBefore, &id)).unwrap();
    assert_eq!(request.body, "B");
    assert!(coordinator.calendar().store().history().is_empty());
}

#[tokio::test]
async fn test_completing_linked_task_removes_its_event() {
    let mut coordinator = new_coordinator();
    let task = due_in("Exam revision", 30);
    let id = task.id().clone();
    coordinator.add(task).await;

    assert!(coordinator.link_to_calendar(&id).await.is_success());
    assert!(coordinator.task(&id).unwrap().calendar_linked());
    let event_id = coordinator.calendar().event_id(&id).unwrap().to_string();
    assert_eq!(coordinator.calendar().store().len(), 1);

    assert!(coordinator.complete(&id).await.is_success());
    assert!(coordinator.calendar().store().is_empty());
    assert!(pending_ids(&coordinator).await.is_empty());
    assert_eq!(
        coordinator.calendar().store().history(),
        vec![StoreCall::Created(event_id.clone()), StoreCall::Removed(event_id)],
    );

    // The task does not claim an event anymore
    assert_eq!(coordinator.task(&id).unwrap().calendar_linked(), false);
    assert!(!coordinator.calendar().is_linked(&id));

    // Reopening brings the reminders back, not the event
    assert!(coordinator.uncomplete(&id).await.is_success());
    assert!(coordinator.calendar().store().is_empty());
    assert_eq!(coordinator.task(&id).unwrap().calendar_linked(), false);
    assert_eq!(pending_ids(&coordinator).await.len(), 2);

    assert!(coordinator.link_to_calendar(&id).await.is_success());
    assert_eq!(coordinator.calendar().store().len(), 1);
}

#[tokio::test]
async fn test_completed_task_has_nothing_to_unlink() {
    let mut coordinator = new_coordinator();
    let task = due_in("Lab report", 30);
    let id = task.id().clone();
    coordinator.add(task).await;
    coordinator.link_to_calendar(&id).await;
    coordinator.complete(&id).await;

    let completion = coordinator.unlink_from_calendar(&id).await;
    assert_eq!(completion.error(), Some(format!("task {} is not linked to a calendar event", id).as_str()));
    assert_eq!(coordinator.task(&id).unwrap().calendar_linked(), false);
}

#[tokio::test]
async fn test_failed_removal_keeps_the_link() {
    let mut coordinator = new_coordinator();
    let task = due_in("Essay", 30);
    let id = task.id().clone();
    coordinator.add(task).await;
    coordinator.link_to_calendar(&id).await;
    let event_id = coordinator.calendar().event_id(&id).unwrap().to_string();

    coordinator.calendar().store().set_mock_behaviour(MockBehaviour {
        remove_event_behaviour: (0, 1),
        ..MockBehaviour::default()
    });
    assert!(coordinator.complete(&id).await.is_success());
    assert_eq!(coordinator.calendar().store().len(), 1);
    assert!(coordinator.task(&id).unwrap().calendar_linked());

    // Reopening refreshes the event that is still there
    coordinator.calendar().store().clear_history();
    assert!(coordinator.uncomplete(&id).await.is_success());
    assert_eq!(coordinator.calendar().store().history(), vec![StoreCall::Updated(event_id)]);
    assert!(coordinator.task(&id).unwrap().calendar_linked());
}

#[tokio::test]
async fn test_linking_twice_keeps_a_single_event() {
    let mut coordinator = new_coordinator();
    let task = due_in("Project milestone", 48);
    let id = task.id().clone();
    coordinator.add(task).await;

    assert!(coordinator.link_to_calendar(&id).await.is_success());
    assert!(coordinator.link_to_calendar(&id).await.is_success());
    assert_eq!(coordinator.calendar().store().len(), 1);
}

#[tokio::test]
async fn test_vanished_event_clears_the_link() {
    let mut coordinator = new_coordinator();
    let task = due_in("Essay", 30);
    let id = task.id().clone();
    coordinator.add(task.clone()).await;
    coordinator.link_to_calendar(&id).await;

    let event_id = coordinator.calendar().event_id(&id).unwrap().to_string();
    assert!(coordinator.calendar().store().delete_externally(&event_id));

    let mut moved = coordinator.task(&id).unwrap();
    moved.set_due_date(Some(Utc::now() + Duration::hours(60)));
    // The task update itself succeeds
    assert!(coordinator.update(moved).await.is_success());

    let stored = coordinator.task(&id).unwrap();
    assert_eq!(stored.calendar_linked(), false);
    assert!(!coordinator.calendar().is_linked(&id));
}

#[tokio::test]
async fn test_unlink() {
    let mut coordinator = new_coordinator();
    let task = due_in("Reading", 30);
    let id = task.id().clone();
    coordinator.add(task).await;

    let completion = coordinator.unlink_from_calendar(&id).await;
    assert_eq!(completion.error(), Some(format!("task {} is not linked to a calendar event", id).as_str()));

    coordinator.link_to_calendar(&id).await;
    assert!(coordinator.unlink_from_calendar(&id).await.is_success());
    assert!(coordinator.calendar().store().is_empty());
    assert_eq!(coordinator.task(&id).unwrap().calendar_linked(), false);

    // The event was deleted from the calendar app in the meantime
    coordinator.link_to_calendar(&id).await;
    let event_id = coordinator.calendar().event_id(&id).unwrap().to_string();
    coordinator.calendar().store().delete_externally(&event_id);
    let completion = coordinator.unlink_from_calendar(&id).await;
    assert_eq!(completion.error(), Some(format!("calendar event {} no longer exists", event_id).as_str()));
    assert_eq!(coordinator.task(&id).unwrap().calendar_linked(), false);
}

#[tokio::test]
async fn test_calendar_access_denied() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut coordinator = TaskCoordinator::new(
        Arc::new(MemoryStore::new()),
        MemoryEventStore::with_access(false),
        MemoryNotificationCenter::new(),
    );
    let task = due_in("Essay", 30);
    let id = task.id().clone();
    coordinator.add(task).await;

    assert_eq!(coordinator.request_calendar_access().await.error(), Some("Calendar access was denied"));
    let completion = coordinator.link_to_calendar(&id).await;
    assert_eq!(completion.error(), Some("calendar access has not been granted"));
    assert_eq!(coordinator.task(&id).unwrap().calendar_linked(), false);
    assert!(coordinator.calendar().store().is_empty());
}

#[tokio::test]
async fn test_platform_failures_do_not_roll_back_tasks() {
    let mut coordinator = new_coordinator();
    let task = due_in("Essay", 30);
    let id = task.id().clone();

    coordinator.notifications().center().set_mock_behaviour(MockBehaviour {
        add_notification_behaviour: (0, 1),
        ..MockBehaviour::default()
    });
    assert!(coordinator.add(task).await.is_success());
    assert_eq!(coordinator.tasks().len(), 1);
    assert_eq!(pending_ids(&coordinator).await, vec![reminder_id(ReminderOffset::HourBefore, &id)]);

    coordinator.link_to_calendar(&id).await;
    let event_id = coordinator.calendar().event_id(&id).unwrap().to_string();

    // The event cannot be removed on completion, then vanishes from the calendar app
    coordinator.calendar().store().set_mock_behaviour(MockBehaviour {
        remove_event_behaviour: (0, 1),
        ..MockBehaviour::default()
    });
    coordinator.complete(&id).await;
    assert!(coordinator.task(&id).unwrap().calendar_linked());
    assert!(coordinator.calendar().store().delete_externally(&event_id));

    // Recreating the event fails: the task is reopened anyway, and is not considered linked anymore
    coordinator.calendar().store().set_mock_behaviour(MockBehaviour {
        create_event_behaviour: (0, 1),
        ..MockBehaviour::default()
    });
    assert!(coordinator.uncomplete(&id).await.is_success());
    let stored = coordinator.task(&id).unwrap();
    assert_eq!(stored.completed(), false);
    assert_eq!(stored.calendar_linked(), false);
    assert!(coordinator.calendar().store().is_empty());
}

#[tokio::test]
async fn test_notification_permission_is_requested_once() {
    let mut coordinator = new_coordinator();
    coordinator.notifications().center().set_mock_behaviour(MockBehaviour {
        request_authorization_behaviour: (1, 1),
        ..MockBehaviour::default()
    });

    assert!(coordinator.request_notification_permission().await.is_success());
    // The center would fail if it were asked again
    assert!(coordinator.request_notification_permission().await.is_success());
    assert!(coordinator.add(Task::new("Quiz")).await.is_success());
}

#[tokio::test]
async fn test_digests() {
    let mut coordinator = new_coordinator();
    coordinator.add(due_in("Essay", 30)).await;
    let mut done = Task::new("Old homework");
    done.set_completed(true);
    coordinator.add(done).await;

    assert!(coordinator.refresh_digests().await.is_success());
    let center = coordinator.notifications().center();
    let daily = center.pending_request(DAILY_DIGEST_ID).unwrap();
    assert_eq!(daily.title, "Daily Summary");
    assert!(daily.body.contains("pending"));
    assert!(center.pending_request(EVENING_REMINDER_ID).is_some());

    // Refreshing replaces the digests
    assert!(coordinator.refresh_digests().await.is_success());
    let digests = pending_ids(&coordinator).await.into_iter()
        .filter(|id| id == DAILY_DIGEST_ID || id == EVENING_REMINDER_ID)
        .count();
    assert_eq!(digests, 2);
}

#[tokio::test]
async fn test_export_calendar() {
    let mut coordinator = new_coordinator();
    let linked = due_in("Physics exam", 30);
    let linked_id = linked.id().clone();
    coordinator.add(linked).await;
    coordinator.add(due_in("Not in the calendar", 30)).await;
    coordinator.link_to_calendar(&linked_id).await;

    let ics = coordinator.export_calendar().await;
    assert!(ics.starts_with("BEGIN:VCALENDAR"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    assert!(ics.contains("SUMMARY:Physics exam"));
}

#[tokio::test]
async fn test_state_survives_a_restart() {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = std::env::temp_dir().join(format!("campus-planner-test-{}.json", uuid::Uuid::new_v4()));
    let task = due_in("Thesis draft", 72);
    let id = task.id().clone();

    {
        let settings = Arc::new(FileStore::new(&path));
        let mut coordinator = TaskCoordinator::new(settings, MemoryEventStore::new(), MemoryNotificationCenter::new());
        assert!(coordinator.add(task).await.is_success());
        assert!(coordinator.link_to_calendar(&id).await.is_success());
    }

    let settings = Arc::new(FileStore::from_file(&path).unwrap());
    let coordinator = TaskCoordinator::new(settings, MemoryEventStore::new(), MemoryNotificationCenter::new());
    let stored = coordinator.task(&id).unwrap();
    assert_eq!(stored.title(), "Thesis draft");
    assert!(stored.calendar_linked());
    assert!(coordinator.calendar().is_linked(&id));

    std::fs::remove_file(&path).unwrap();
}
