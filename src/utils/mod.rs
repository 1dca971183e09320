//! Some utility functions

pub mod comparison;

use crate::grades::GradeEntry;
use crate::task::{Priority, Task};

/// A debug utility that pretty-prints tasks
pub fn print_task_list(tasks: &[Task]) {
    for task in tasks {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    let completion = if task.completed() { "✓" } else { " " };
    let linked = if task.calendar_linked() { "@" } else { " " };
    let priority = match task.priority() {
        Priority::Low => ".",
        Priority::Medium => "-",
        Priority::High => "!",
    };
    let due = match task.due_date() {
        Some(due) => due.format("%Y-%m-%d %H:%M").to_string(),
        None => String::from("no due date     "),
    };
    println!("    {}{}{} {}  {}\t{:?}\t{}", completion, linked, priority, due, task.title(), task.category(), task.id());
}

/// A debug utility that pretty-prints grades
pub fn print_grade(entry: &GradeEntry) {
    let percentage = match entry.percentage() {
        Some(p) => format!("{:5.1}%", p),
        None => String::from("  n/a"),
    };
    println!("    {}\t{}\t{}/{} (x{})\t{}", entry.course(), entry.title(), entry.score(), entry.max_score(), entry.weight(), percentage);
}
