//! An event store that keeps its events in memory

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::calendar::{CalendarEvent, EventDetails};
use crate::mock_behaviour::MockBehaviour;
use crate::traits::{EventStore, PlatformError};

/// Something that happened to a [`MemoryEventStore`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Created(String),
    Updated(String),
    Removed(String),
}

#[derive(Debug, Default)]
struct StoreState {
    access_granted: bool,
    events: HashMap<String, EventDetails>,
    history: Vec<StoreCall>,
    mock_behaviour: MockBehaviour,
}

/// An [`EventStore`] that is not backed by any real calendar.
///
/// Like OS calendars, it refuses modifications until access has been requested and granted.
/// It records every modification so that tests can check what has been done.
#[derive(Debug)]
pub struct MemoryEventStore {
    grant_access: bool,
    state: Mutex<StoreState>,
}

impl MemoryEventStore {
    /// A store whose user grants access
    pub fn new() -> Self {
        Self::with_access(true)
    }

    /// A store whose user answers `grant` when asked for access
    pub fn with_access(grant: bool) -> Self {
        Self {
            grant_access: grant,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Make the following calls behave as described by `behaviour`
    pub fn set_mock_behaviour(&self, behaviour: MockBehaviour) {
        self.state.lock().unwrap().mock_behaviour = behaviour;
    }

    /// Returns every modification made so far, oldest first
    pub fn history(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn clear_history(&self) {
        self.state.lock().unwrap().history.clear();
    }

    /// Returns how many events this store contains
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delete an event behind the back of its users, like a user would do from their calendar app
    pub fn delete_externally(&self, identifier: &str) -> bool {
        self.state.lock().unwrap().events.remove(identifier).is_some()
    }

    fn check_access(state: &StoreState) -> Result<(), PlatformError> {
        if state.access_granted == false {
            return Err("Calendar access has not been granted".into());
        }
        Ok(())
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn request_access(&self) -> Result<bool, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.mock_behaviour.can_request_access()?;
        state.access_granted = self.grant_access;
        Ok(state.access_granted)
    }

    async fn create_event(&self, details: EventDetails) -> Result<String, PlatformError> {
        let mut state = self.state.lock().unwrap();
        Self::check_access(&state)?;
        state.mock_behaviour.can_create_event()?;

        let identifier = Uuid::new_v4().to_hyphenated().to_string();
        state.events.insert(identifier.clone(), details);
        state.history.push(StoreCall::Created(identifier.clone()));
        Ok(identifier)
    }

    async fn event(&self, identifier: &str) -> Option<CalendarEvent> {
        self.state.lock().unwrap()
            .events
            .get(identifier)
            .map(|details| CalendarEvent::new(identifier.to_string(), details.clone()))
    }

    async fn update_event(&self, identifier: &str, details: EventDetails) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        Self::check_access(&state)?;
        state.mock_behaviour.can_update_event()?;

        match state.events.get_mut(identifier) {
            None => return Err(format!("No event with identifier {}", identifier).into()),
            Some(existing) => *existing = details,
        }
        state.history.push(StoreCall::Updated(identifier.to_string()));
        Ok(())
    }

    async fn remove_event(&self, identifier: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        Self::check_access(&state)?;
        state.mock_behaviour.can_remove_event()?;

        if state.events.remove(identifier).is_none() {
            return Err(format!("No event with identifier {}", identifier).into());
        }
        state.history.push(StoreCall::Removed(identifier.to_string()));
        Ok(())
    }
}
