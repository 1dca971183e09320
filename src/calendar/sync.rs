//! Keeps calendar events in sync with the tasks they mirror

use std::collections::HashMap;
use std::sync::Arc;

use crate::calendar::{CalendarEvent, EventDetails};
use crate::config::CALENDAR_LINKS_KEY;
use crate::error::SyncError;
use crate::task::{Task, TaskId};
use crate::traits::{EventStore, KeyValueStore};

/// Creates, updates and removes the calendar events of tasks.
///
/// It maintains the (persisted) mapping between task IDs and the identifiers of their events.
#[derive(Debug)]
pub struct CalendarSync<S: KeyValueStore, E: EventStore> {
    settings: Arc<S>,
    store: E,
    links: HashMap<TaskId, String>,
    access_granted: bool,
}

impl<S: KeyValueStore, E: EventStore> CalendarSync<S, E> {
    /// Create an adapter, and load the existing links from `settings`
    pub fn new(settings: Arc<S>, store: E) -> Self {
        let links = load_links(settings.as_ref());
        Self { settings, store, links, access_granted: false }
    }

    /// Returns the underlying event store
    pub fn store(&self) -> &E {
        &self.store
    }

    pub fn has_access(&self) -> bool {
        self.access_granted
    }

    /// Ask for the permission to edit the calendar.
    /// This must have been granted before any event can be created, updated or removed
    pub async fn request_access(&mut self) -> Result<bool, SyncError> {
        let granted = self.store.request_access().await.map_err(SyncError::platform)?;
        self.access_granted = granted;
        log::info!("Calendar access {}", if granted { "granted" } else { "denied" });
        Ok(granted)
    }

    /// Whether an event is known for this task
    pub fn is_linked(&self, task_id: &TaskId) -> bool {
        self.links.contains_key(task_id)
    }

    /// Returns the identifier of the event of this task
    pub fn event_id(&self, task_id: &TaskId) -> Option<&str> {
        self.links.get(task_id).map(|id| id.as_str())
    }

    /// Create the event of a task, and return its identifier
    pub async fn create(&mut self, task: &Task) -> Result<String, SyncError> {
        let details = EventDetails::from_task(task)
            .ok_or_else(|| SyncError::MissingDueDate(task.id().clone()))?;
        self.check_access()?;

        let event_id = self.store.create_event(details).await.map_err(SyncError::platform)?;
        log::debug!("Created event {} for task {}", event_id, task.id());
        self.links.insert(task.id().clone(), event_id.clone());
        self.save_links();
        Ok(event_id)
    }

    /// Remove the event of a task.
    ///
    /// In case the event does not exist anymore, the link is forgotten, but an error is still returned.
    pub async fn remove(&mut self, task_id: &TaskId) -> Result<(), SyncError> {
        let event_id = self.linked_event(task_id)?;
        self.check_access()?;

        if self.store.event(&event_id).await.is_none() {
            log::warn!("Event {} of task {} has vanished from the calendar", event_id, task_id);
            self.forget(task_id);
            return Err(SyncError::EventMissing(event_id));
        }

        self.store.remove_event(&event_id).await.map_err(SyncError::platform)?;
        log::debug!("Removed event {} of task {}", event_id, task_id);
        self.forget(task_id);
        Ok(())
    }

    /// Rewrite the event of a task with its current title, description and due date
    pub async fn update(&mut self, task: &Task) -> Result<(), SyncError> {
        let event_id = self.linked_event(task.id())?;
        self.check_access()?;

        if self.store.event(&event_id).await.is_none() {
            log::warn!("Event {} of task {} has vanished from the calendar", event_id, task.id());
            self.forget(task.id());
            return Err(SyncError::EventMissing(event_id));
        }

        let details = EventDetails::from_task(task)
            .ok_or_else(|| SyncError::MissingDueDate(task.id().clone()))?;
        self.store.update_event(&event_id, details).await.map_err(SyncError::platform)?;
        log::debug!("Updated event {} of task {}", event_id, task.id());
        Ok(())
    }

    /// Returns the events of every linked task that still exist
    pub async fn linked_events(&self) -> Vec<CalendarEvent> {
        let mut event_ids: Vec<&String> = self.links.values().collect();
        event_ids.sort();

        let mut events = Vec::new();
        for event_id in event_ids {
            match self.store.event(event_id).await {
                Some(event) => events.push(event),
                None => log::debug!("Linked event {} does not exist anymore", event_id),
            }
        }
        events.sort_by(|left, right| left.details().start.cmp(&right.details().start));
        events
    }

    /// Export the events of every linked task as an iCal file
    pub async fn export_ics(&self) -> String {
        crate::ical::build_from(&self.linked_events().await)
    }

    fn check_access(&self) -> Result<(), SyncError> {
        if self.access_granted == false {
            return Err(SyncError::AccessDenied);
        }
        Ok(())
    }

    fn linked_event(&self, task_id: &TaskId) -> Result<String, SyncError> {
        self.links.get(task_id)
            .cloned()
            .ok_or_else(|| SyncError::NotLinked(task_id.clone()))
    }

    fn forget(&mut self, task_id: &TaskId) {
        self.links.remove(task_id);
        self.save_links();
    }

    fn save_links(&self) {
        let encoded = match serde_json::to_string(&self.links) {
            Ok(encoded) => encoded,
            Err(err) => {
                log::warn!("Unable to serialize calendar links: {}", err);
                return;
            },
        };
        if let Err(err) = self.settings.set(CALENDAR_LINKS_KEY, encoded) {
            log::warn!("Unable to save calendar links: {}", err);
        }
    }
}


fn load_links<S: KeyValueStore>(settings: &S) -> HashMap<TaskId, String> {
    let encoded = match settings.get(CALENDAR_LINKS_KEY) {
        None => return HashMap::new(),
        Some(encoded) => encoded,
    };
    match serde_json::from_str(&encoded) {
        Ok(links) => links,
        Err(err) => {
            log::warn!("Invalid calendar links ({}). Starting with no link", err);
            if let Err(err) = settings.remove(CALENDAR_LINKS_KEY) {
                log::error!("Unable to clear the corrupted calendar links: {}", err);
            }
            HashMap::new()
        },
    }
}
