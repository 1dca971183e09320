//! This module ties tasks, their calendar events and their reminders together
//!
//! Every task mutation goes through a [`TaskCoordinator`], which persists the task list, then applies the side effects the change calls for.

use std::sync::Arc;

use crate::calendar::CalendarSync;
use crate::error::{Completion, SyncError};
use crate::notification::NotificationScheduler;
use crate::task::{Task, TaskId};
use crate::task_store::TaskStore;
use crate::traits::{EventStore, KeyValueStore, NotificationCenter};


/// How a task changed during an update, regarding its side effects
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The task has just been completed
    Completed,
    /// A completed task has been marked as not completed again
    Reopened,
    /// A pending task got a new title or due date
    Rescheduled,
    /// Nothing that matters to calendars or reminders changed
    Unchanged,
}

impl Transition {
    /// Classify the change between two versions of the same task
    pub fn between(old: &Task, new: &Task) -> Self {
        if !old.completed() && new.completed() {
            Transition::Completed
        } else if old.completed() && !new.completed() {
            Transition::Reopened
        } else if !new.completed() && (old.due_date() != new.due_date() || old.title() != new.title()) {
            Transition::Rescheduled
        } else {
            Transition::Unchanged
        }
    }
}


/// Creates, updates and deletes tasks, and keeps their calendar events and reminders up to date.
///
/// Calendar and notification failures never cancel a task mutation: they are logged, and the
/// task is saved anyway.
#[derive(Debug)]
pub struct TaskCoordinator<S, E, N>
where
    S: KeyValueStore,
    E: EventStore,
    N: NotificationCenter,
{
    tasks: TaskStore<S>,
    calendar: CalendarSync<S, E>,
    notifications: NotificationScheduler<S, N>,
}

impl<S, E, N> TaskCoordinator<S, E, N>
where
    S: KeyValueStore,
    E: EventStore,
    N: NotificationCenter,
{
    /// Create a coordinator.
    ///
    /// `settings` is shared by the task store, the calendar links and the notification preferences.
    pub fn new(settings: Arc<S>, event_store: E, notification_center: N) -> Self {
        Self {
            tasks: TaskStore::new(Arc::clone(&settings)),
            calendar: CalendarSync::new(Arc::clone(&settings), event_store),
            notifications: NotificationScheduler::new(settings, notification_center),
        }
    }

    /// Returns the underlying task store
    pub fn task_store(&self) -> &TaskStore<S> { &self.tasks }
    /// Returns the calendar adapter, that owns the task → event mapping
    pub fn calendar(&self) -> &CalendarSync<S, E> { &self.calendar }
    /// Returns the reminder scheduler
    pub fn notifications(&self) -> &NotificationScheduler<S, N> { &self.notifications }

    /// Returns every task, most recently created first
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.load()
    }

    /// Returns the task with this ID
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.tasks.get(id)
    }

    /// Ask for the permission to edit the calendar
    pub async fn request_calendar_access(&mut self) -> Completion {
        match self.calendar.request_access().await {
            Ok(true) => Completion::success(),
            Ok(false) => Completion::failure("Calendar access was denied"),
            Err(err) => Completion::failure(err),
        }
    }

    /// Ask for the permission to display notifications (the user is prompted only once)
    pub async fn request_notification_permission(&self) -> Completion {
        match self.notifications.request_authorization().await {
            Ok(true) => Completion::success(),
            Ok(false) => Completion::failure("Notifications are not allowed"),
            Err(err) => Completion::failure(err),
        }
    }

    /// Add a new task, and schedule its reminders
    pub async fn add(&mut self, task: Task) -> Completion {
        let mut tasks = self.tasks.load();
        if tasks.iter().any(|t| t.id() == task.id()) {
            return Completion::failure(SyncError::DuplicateTask(task.id().clone()));
        }

        tasks.insert(0, task.clone());
        if let Err(err) = self.tasks.save(&tasks) {
            return Completion::failure(err);
        }
        log::info!("Added task {} ({})", task.id(), task.title());

        if let Err(err) = self.notifications.schedule(&task).await {
            log::warn!("Unable to schedule reminders for task {}: {}", task.id(), err);
        }
        Completion::success()
    }

    /// Replace the stored task that has the same ID, then update its calendar event and reminders
    pub async fn update(&mut self, task: Task) -> Completion {
        let mut tasks = self.tasks.load();
        let old = match tasks.iter_mut().find(|t| t.id() == task.id()) {
            None => return Completion::failure(SyncError::TaskNotFound(task.id().clone())),
            Some(stored) => std::mem::replace(stored, task.clone()),
        };
        if let Err(err) = self.tasks.save(&tasks) {
            return Completion::failure(err);
        }

        let transition = Transition::between(&old, &task);
        log::debug!("Task {} updated ({:?})", task.id(), transition);
        match transition {
            Transition::Completed => self.on_completed(&task).await,
            Transition::Reopened => self.on_reopened(&task).await,
            Transition::Rescheduled => self.on_rescheduled(&task).await,
            Transition::Unchanged => {},
        }
        Completion::success()
    }

    /// Mark a task as completed
    pub async fn complete(&mut self, id: &TaskId) -> Completion {
        self.set_completed(id, true).await
    }

    /// Mark a task as not completed
    pub async fn uncomplete(&mut self, id: &TaskId) -> Completion {
        self.set_completed(id, false).await
    }

    async fn set_completed(&mut self, id: &TaskId, completed: bool) -> Completion {
        let mut task = match self.tasks.get(id) {
            None => return Completion::failure(SyncError::TaskNotFound(id.clone())),
            Some(task) => task,
        };
        task.set_completed(completed);
        self.update(task).await
    }

    /// Delete a task, its calendar event and its reminders
    pub async fn delete(&mut self, id: &TaskId) -> Completion {
        let mut tasks = self.tasks.load();
        let position = match tasks.iter().position(|t| t.id() == id) {
            None => return Completion::failure(SyncError::TaskNotFound(id.clone())),
            Some(position) => position,
        };

        if self.calendar.is_linked(id) {
            if let Err(err) = self.remove_event(id).await {
                log::warn!("Unable to remove the calendar event of deleted task {}: {}", id, err);
            }
        }
        self.notifications.cancel(id).await;

        let removed = tasks.remove(position);
        log::info!("Deleted task {} ({})", id, removed.title());
        self.tasks.save(&tasks).into()
    }

    /// Create a calendar event for this task
    pub async fn link_to_calendar(&mut self, id: &TaskId) -> Completion {
        let task = match self.tasks.get(id) {
            None => return Completion::failure(SyncError::TaskNotFound(id.clone())),
            Some(task) => task,
        };
        if task.due_date().is_none() {
            return Completion::failure(SyncError::MissingDueDate(id.clone()));
        }

        if let Err(err) = self.create_or_update_event(&task).await {
            return Completion::failure(err);
        }
        self.set_link_flag(id, true).into()
    }

    /// Remove the calendar event of this task
    pub async fn unlink_from_calendar(&mut self, id: &TaskId) -> Completion {
        if self.tasks.get(id).is_none() {
            return Completion::failure(SyncError::TaskNotFound(id.clone()));
        }

        match self.remove_event(id).await {
            Ok(()) => self.set_link_flag(id, false).into(),
            Err(err) => {
                if err.is_not_found() {
                    // There is no event anymore, whatever the task says
                    if let Err(save_err) = self.set_link_flag(id, false) {
                        log::warn!("Unable to clear the calendar link of task {}: {}", id, save_err);
                    }
                }
                Completion::failure(err)
            },
        }
    }

    /// (Re)schedule the daily digests, using the current tasks
    pub async fn refresh_digests(&self) -> Completion {
        let tasks = self.tasks.load();
        if let Err(err) = self.notifications.schedule_daily_digest(&tasks).await {
            return Completion::failure(err);
        }
        self.notifications.schedule_evening_reminder(&tasks).await.into()
    }

    /// Returns the calendar events of the linked tasks, as an iCal file
    pub async fn export_calendar(&self) -> String {
        self.calendar.export_ics().await
    }


    async fn on_completed(&mut self, task: &Task) {
        self.notifications.cancel(task.id()).await;

        if task.calendar_linked() {
            match self.remove_event(task.id()).await {
                Ok(()) => self.clear_link_flag(task.id()),
                Err(err) if err.is_not_found() => {
                    log::warn!("Calendar event of task {} is gone: {}", task.id(), err);
                    self.clear_link_flag(task.id());
                },
                // The event still exists, the task stays linked to it
                Err(err) => log::warn!("Unable to remove the calendar event of task {}: {}", task.id(), err),
            }
        }
    }

    async fn on_reopened(&mut self, task: &Task) {
        if let Err(err) = self.notifications.schedule(task).await {
            log::warn!("Unable to schedule reminders for task {}: {}", task.id(), err);
        }

        // Only tasks whose event could not be removed on completion are still linked
        if task.calendar_linked() && task.due_date().is_some() {
            if let Err(err) = self.create_or_update_event(task).await {
                log::warn!("Unable to refresh the calendar event of task {}: {}", task.id(), err);
                self.clear_link_flag(task.id());
            }
        }
    }

    async fn on_rescheduled(&mut self, task: &Task) {
        if let Err(err) = self.notifications.reschedule(task).await {
            log::warn!("Unable to reschedule reminders for task {}: {}", task.id(), err);
        }

        if task.calendar_linked() {
            match self.update_event(task).await {
                Ok(()) => {},
                Err(err) if err.is_not_found() => {
                    log::warn!("Calendar event of task {} is gone: {}", task.id(), err);
                    self.clear_link_flag(task.id());
                },
                Err(err) => log::warn!("Unable to update the calendar event of task {}: {}", task.id(), err),
            }
        }
    }

    async fn ensure_calendar_access(&mut self) -> Result<(), SyncError> {
        if self.calendar.has_access() {
            return Ok(());
        }
        match self.calendar.request_access().await? {
            true => Ok(()),
            false => Err(SyncError::AccessDenied),
        }
    }

    /// Create the event of a task, or refresh it in case the task still has one
    async fn create_or_update_event(&mut self, task: &Task) -> Result<(), SyncError> {
        self.ensure_calendar_access().await?;
        if self.calendar.is_linked(task.id()) {
            match self.calendar.update(task).await {
                Ok(()) => return Ok(()),
                // The stale link has been pruned, a new event is needed
                Err(err) if err.is_not_found() => {},
                Err(err) => return Err(err),
            }
        }
        self.calendar.create(task).await.map(|_| ())
    }

    async fn update_event(&mut self, task: &Task) -> Result<(), SyncError> {
        self.ensure_calendar_access().await?;
        self.calendar.update(task).await
    }

    async fn remove_event(&mut self, id: &TaskId) -> Result<(), SyncError> {
        self.ensure_calendar_access().await?;
        self.calendar.remove(id).await
    }

    fn set_link_flag(&self, id: &TaskId, linked: bool) -> Result<(), SyncError> {
        let mut tasks = self.tasks.load();
        match tasks.iter_mut().find(|t| t.id() == id) {
            None => Err(SyncError::TaskNotFound(id.clone())),
            Some(task) => {
                task.set_calendar_linked(linked);
                self.tasks.save(&tasks)
            },
        }
    }

    fn clear_link_flag(&self, id: &TaskId) {
        if let Err(err) = self.set_link_flag(id, false) {
            log::warn!("Unable to clear the calendar link of task {}: {}", id, err);
        }
    }
}
