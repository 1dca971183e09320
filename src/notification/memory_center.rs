//! A notification center that keeps its pending requests in memory

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::mock_behaviour::MockBehaviour;
use crate::notification::NotificationRequest;
use crate::traits::{NotificationCenter, PlatformError};

/// Something that happened to a [`MemoryNotificationCenter`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CenterCall {
    Added(String),
    Removed(Vec<String>),
}

#[derive(Debug, Default)]
struct CenterState {
    authorized: bool,
    pending: HashMap<String, NotificationRequest>,
    history: Vec<CenterCall>,
    mock_behaviour: MockBehaviour,
}

/// A [`NotificationCenter`] that does not display anything.
///
/// It can be used headless, and records every call so that tests can check what has been scheduled.
#[derive(Debug)]
pub struct MemoryNotificationCenter {
    grant_authorization: bool,
    state: Mutex<CenterState>,
}

impl MemoryNotificationCenter {
    /// A center whose user accepts notifications
    pub fn new() -> Self {
        Self::with_authorization(true)
    }

    /// A center whose user answers `grant` when prompted
    pub fn with_authorization(grant: bool) -> Self {
        Self {
            grant_authorization: grant,
            state: Mutex::new(CenterState::default()),
        }
    }

    /// Make the following calls behave as described by `behaviour`
    pub fn set_mock_behaviour(&self, behaviour: MockBehaviour) {
        self.state.lock().unwrap().mock_behaviour = behaviour;
    }

    /// Returns every call made so far, oldest first
    pub fn history(&self) -> Vec<CenterCall> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn clear_history(&self) {
        self.state.lock().unwrap().history.clear();
    }

    /// Returns the pending request with this identifier
    pub fn pending_request(&self, identifier: &str) -> Option<NotificationRequest> {
        self.state.lock().unwrap().pending.get(identifier).cloned()
    }
}

impl Default for MemoryNotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationCenter for MemoryNotificationCenter {
    async fn request_authorization(&self) -> Result<bool, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.mock_behaviour.can_request_authorization()?;
        state.authorized = self.grant_authorization;
        Ok(state.authorized)
    }

    async fn is_authorized(&self) -> bool {
        self.state.lock().unwrap().authorized
    }

    async fn add(&self, request: NotificationRequest) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.mock_behaviour.can_add_notification()?;
        state.history.push(CenterCall::Added(request.identifier.clone()));
        state.pending.insert(request.identifier.clone(), request);
        Ok(())
    }

    async fn remove_pending(&self, identifiers: &[String]) {
        let mut state = self.state.lock().unwrap();
        for identifier in identifiers {
            state.pending.remove(identifier);
        }
        state.history.push(CenterCall::Removed(identifiers.to_vec()));
    }

    async fn pending(&self) -> Vec<NotificationRequest> {
        let mut requests: Vec<NotificationRequest> = self.state.lock().unwrap().pending.values().cloned().collect();
        requests.sort_by(|left, right| left.identifier.cmp(&right.identifier));
        requests
    }
}
