//! To-do tasks

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The unique identifier of a [`Task`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    /// Generate a random TaskId.
    pub fn random() -> Self {
        let random = Uuid::new_v4().to_hyphenated().to_string();
        Self { content: random }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}
impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self { content: s.to_string() }
    }
}
impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// What kind of work a task is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Homework,
    Exam,
    Project,
    Reading,
    Personal,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Homework, Category::Exam, Category::Project,
        Category::Reading, Category::Personal, Category::Other,
    ];
}


/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    is_completed: bool,
    priority: Priority,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    /// Reference to a class of the timetable this task is about
    schedule_ref: Option<String>,
    #[serde(default)]
    category: Category,
    #[serde(default)]
    tags: Vec<String>,
    /// Whether a calendar event mirrors this task
    #[serde(default)]
    calendar_linked: bool,
}

impl Task {
    /// Create a brand new Task.
    /// This will pick a new (random) task ID, and use the current time as its creation date.
    pub fn new<S: ToString>(title: S) -> Self {
        Self::new_with_parameters(TaskId::random(), title.to_string(), Utc::now())
    }

    /// Create a new Task instance with a known ID and creation date
    pub fn new_with_parameters(id: TaskId, title: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            description: None,
            is_completed: false,
            priority: Priority::default(),
            due_date: None,
            created_at,
            schedule_ref: None,
            category: Category::default(),
            tags: Vec::new(),
            calendar_linked: false,
        }
    }

    pub fn with_description<S: ToString>(mut self, description: S) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_schedule_ref<S: ToString>(mut self, schedule_ref: S) -> Self {
        self.schedule_ref = Some(schedule_ref.to_string());
        self
    }

    pub fn id(&self) -> &TaskId                        { &self.id                     }
    pub fn title(&self) -> &str                        { &self.title                  }
    pub fn description(&self) -> Option<&str>          { self.description.as_deref()  }
    pub fn completed(&self) -> bool                    { self.is_completed            }
    pub fn priority(&self) -> Priority                 { self.priority                }
    pub fn due_date(&self) -> Option<&DateTime<Utc>>   { self.due_date.as_ref()       }
    pub fn created_at(&self) -> &DateTime<Utc>         { &self.created_at             }
    pub fn schedule_ref(&self) -> Option<&str>         { self.schedule_ref.as_deref() }
    pub fn category(&self) -> Category                 { self.category                }
    pub fn tags(&self) -> &[String]                    { &self.tags                   }
    pub fn calendar_linked(&self) -> bool              { self.calendar_linked         }

    pub fn set_title(&mut self, new_title: String) {
        self.title = new_title;
    }
    pub fn set_description(&mut self, new_description: Option<String>) {
        self.description = new_description;
    }
    pub fn set_completed(&mut self, completed: bool) {
        self.is_completed = completed;
    }
    pub fn set_priority(&mut self, new_priority: Priority) {
        self.priority = new_priority;
    }
    pub fn set_due_date(&mut self, new_due_date: Option<DateTime<Utc>>) {
        self.due_date = new_due_date;
    }
    pub fn set_category(&mut self, new_category: Category) {
        self.category = new_category;
    }
    pub fn set_tags(&mut self, new_tags: Vec<String>) {
        self.tags = new_tags;
    }
    pub fn set_calendar_linked(&mut self, linked: bool) {
        self.calendar_linked = linked;
    }

    /// Whether this task is still pending while its due date has passed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => !self.is_completed && due < now,
            None => false,
        }
    }

    /// Whether this task is due on the given (local) day
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date
            .map(|due| due.with_timezone(&Local).date_naive() == day)
            .unwrap_or(false)
    }
}
