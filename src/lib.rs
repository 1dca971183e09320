//! This crate provides the core of a student planner.
//!
//! Tasks are persisted in a [`TaskStore`](task_store::TaskStore), on top of any application settings store implementing [`KeyValueStore`](traits::KeyValueStore) (see the [`settings`] module).
//!
//! Tasks that have a due date can be mirrored in a calendar by the [`calendar`] module, and get local reminders thanks to the [`notification`] module. \
//! Both wrap platform services (an OS calendar, an OS notification center) that are abstracted by the traits of the [`traits`] module. \
//! In-memory implementations are provided, so that this crate can be used (and tested) without any of them.
//!
//! A [`TaskCoordinator`] ties everything together: every task mutation goes through it, and it decides which calendar and notification changes this mutation calls for.
//!
//! This crate also provides a small [`GradeBook`](grades::GradeBook), to keep track of course grades.

pub mod traits;
pub mod config;
pub mod error;
pub use error::{Completion, SyncError};

mod task;
pub use task::{Category, Priority, Task, TaskId};
pub mod task_store;
pub mod settings;

pub mod calendar;
pub mod notification;
pub mod ical;
pub mod coordinator;
pub use coordinator::TaskCoordinator;

pub mod grades;
pub mod mock_behaviour;
pub mod utils;

/// A coordinator that only relies on in-memory platform services, persisted to a JSON settings file
pub type HeadlessCoordinator = TaskCoordinator<settings::FileStore, calendar::MemoryEventStore, notification::MemoryNotificationCenter>;
