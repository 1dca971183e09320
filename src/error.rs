//! Error types, and the completion values handed back to callers

use crate::task::TaskId;

/// Errors returned by the calendar, notification and persistence layers.
///
/// None of them is fatal: the [`TaskCoordinator`](crate::TaskCoordinator) turns them into [`Completion`]s.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("task {0} is not linked to a calendar event")]
    NotLinked(TaskId),

    #[error("calendar event {0} no longer exists")]
    EventMissing(String),

    #[error("task {0} has no due date")]
    MissingDueDate(TaskId),

    #[error("a task with id {0} already exists")]
    DuplicateTask(TaskId),

    #[error("calendar access has not been granted")]
    AccessDenied,

    #[error("unable to persist {key}: {reason}")]
    Storage { key: String, reason: String },

    /// An error reported by the platform calendar or notification framework, kept verbatim
    #[error("{0}")]
    Platform(String),
}

impl SyncError {
    /// Whether this error means that something (a task, a link, an event) does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::TaskNotFound(_) | SyncError::NotLinked(_) | SyncError::EventMissing(_))
    }

    pub(crate) fn platform(err: crate::traits::PlatformError) -> Self {
        SyncError::Platform(err.to_string())
    }
}


/// The outcome of a user-facing operation: a success flag, and a human-readable message in case of failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    success: bool,
    error: Option<String>,
}

impl Completion {
    pub fn success() -> Self {
        Self { success: true, error: None }
    }

    pub fn failure<S: ToString>(message: S) -> Self {
        Self { success: false, error: Some(message.to_string()) }
    }

    pub fn is_success(&self) -> bool { self.success }
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }
}

impl From<Result<(), SyncError>> for Completion {
    fn from(result: Result<(), SyncError>) -> Self {
        match result {
            Ok(()) => Completion::success(),
            Err(err) => Completion::failure(err),
        }
    }
}
