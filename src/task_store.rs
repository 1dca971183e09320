//! Persistence of the task list

use std::sync::Arc;

use crate::config::TASKS_KEY;
use crate::error::SyncError;
use crate::task::{Task, TaskId};
use crate::traits::KeyValueStore;

/// Stores the whole task list as a single encoded value of a [`KeyValueStore`]
#[derive(Debug)]
pub struct TaskStore<S: KeyValueStore> {
    settings: Arc<S>,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(settings: Arc<S>) -> Self {
        Self { settings }
    }

    /// Overwrite the persisted list with `tasks`
    pub fn save(&self, tasks: &[Task]) -> Result<(), SyncError> {
        let encoded = serde_json::to_string(tasks)
            .map_err(|err| SyncError::Storage{ key: TASKS_KEY.to_string(), reason: err.to_string() })?;

        self.settings.set(TASKS_KEY, encoded)
            .map_err(|err| SyncError::Storage{ key: TASKS_KEY.to_string(), reason: err.to_string() })
    }

    /// Returns the persisted tasks, most recently created first.
    ///
    /// A value that cannot be decoded is discarded, and an empty list is returned instead
    pub fn load(&self) -> Vec<Task> {
        let encoded = match self.settings.get(TASKS_KEY) {
            None => return Vec::new(),
            Some(encoded) => encoded,
        };

        let mut tasks: Vec<Task> = match serde_json::from_str(&encoded) {
            Ok(tasks) => tasks,
            Err(err) => {
                log::warn!("Unable to decode the saved tasks ({}). Discarding them", err);
                if let Err(err) = self.settings.remove(TASKS_KEY) {
                    log::error!("Unable to clear the corrupted task list: {}", err);
                }
                return Vec::new();
            },
        };

        tasks.sort_by(|left, right| right.created_at().cmp(left.created_at()));
        tasks
    }

    /// Returns the task matching this ID
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.load()
            .into_iter()
            .find(|task| task.id() == id)
    }
}
