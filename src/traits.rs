//! The seams between this crate and the platform it runs on

use std::error::Error;

use async_trait::async_trait;

use crate::calendar::{CalendarEvent, EventDetails};
use crate::notification::NotificationRequest;

/// Errors reported by platform collaborators
pub type PlatformError = Box<dyn Error + Send + Sync>;

/// An application-scoped settings store (string values, indexed by string keys)
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, overwriting any previous value
    fn set(&self, key: &str, value: String) -> Result<(), PlatformError>;
    /// Remove `key`. Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), PlatformError>;

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).map(|v| v == "true").unwrap_or(false)
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), PlatformError> {
        self.set(key, value.to_string())
    }
}

/// A calendar event store, such as the one provided by the OS
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Ask the user for the permission to edit their calendar.
    /// Returns whether the access has been granted
    async fn request_access(&self) -> Result<bool, PlatformError>;

    /// Create a new event, and return its identifier
    async fn create_event(&self, details: EventDetails) -> Result<String, PlatformError>;

    /// Returns the event matching this identifier, if it (still) exists
    async fn event(&self, identifier: &str) -> Option<CalendarEvent>;

    /// Overwrite the details of an existing event
    async fn update_event(&self, identifier: &str, details: EventDetails) -> Result<(), PlatformError>;

    /// Remove an existing event
    async fn remove_event(&self, identifier: &str) -> Result<(), PlatformError>;
}

/// A local notification center, such as the one provided by the OS
#[async_trait]
pub trait NotificationCenter: Send + Sync {
    /// Prompt the user for the permission to display notifications.
    /// Returns whether the permission has been granted
    async fn request_authorization(&self) -> Result<bool, PlatformError>;

    /// Returns the current authorization, without prompting the user
    async fn is_authorized(&self) -> bool;

    /// Register a pending notification. A request with the same identifier replaces the previous one
    async fn add(&self, request: NotificationRequest) -> Result<(), PlatformError>;

    /// Remove the pending notifications with these identifiers. Unknown identifiers are ignored
    async fn remove_pending(&self, identifiers: &[String]);

    /// Returns the notifications that are still pending
    async fn pending(&self) -> Vec<NotificationRequest>;
}
