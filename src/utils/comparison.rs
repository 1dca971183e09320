//! Utilities to compare custom types
//!
//! These can be used to sort task lists, e.g. with `sort_by`

use std::cmp::Ordering;

use crate::task::Task;

/// Pending tasks first, then earliest due date first (tasks without due date last), then alphabetically
pub fn compare_tasks_by_due_date(left: &Task, right: &Task) -> Ordering {
    left.completed().cmp(&right.completed())
        .then_with(|| match (left.due_date(), right.due_date()) {
            (Some(l), Some(r)) => l.cmp(r),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| Ord::cmp(&left.title().to_lowercase(), &right.title().to_lowercase()))
}

/// Highest priority first, then alphabetically
pub fn compare_tasks_by_priority(left: &Task, right: &Task) -> Ordering {
    right.priority().cmp(&left.priority())
        .then_with(|| Ord::cmp(&left.title().to_lowercase(), &right.title().to_lowercase()))
}
