use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};

use campus_planner::calendar::MemoryEventStore;
use campus_planner::grades::{GradeBook, GradeEntry};
use campus_planner::notification::MemoryNotificationCenter;
use campus_planner::settings::FileStore;
use campus_planner::utils::comparison::compare_tasks_by_due_date;
use campus_planner::{Completion, HeadlessCoordinator, Task, TaskId};

const USAGE: &str = "Usage: planner <command>

Commands:
    list                                      List tasks
    add <title> [hours until due]             Add a task
    done <task id>                            Mark a task as completed
    undo <task id>                            Mark a task as not completed
    rm <task id>                              Delete a task
    grades                                    List grades and course averages
    grade <course> <title> <score> <max> [w]  Record a grade

The settings file can be set with the PLANNER_SETTINGS environment variable.";


#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings_path = std::env::var("PLANNER_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| FileStore::default_file());
    let settings = Arc::new(FileStore::open(&settings_path));

    let mut coordinator = HeadlessCoordinator::new(Arc::clone(&settings), MemoryEventStore::new(), MemoryNotificationCenter::new());

    let command: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let completion = match command.as_slice() {
        ["list"] | [] => {
            let mut tasks = coordinator.tasks();
            tasks.sort_by(compare_tasks_by_due_date);
            println!("---- {} task(s) -----", tasks.len());
            campus_planner::utils::print_task_list(&tasks);
            Completion::success()
        },
        ["add", title] => coordinator.add(Task::new(title)).await,
        ["add", title, hours] => match hours.parse::<i64>() {
            Ok(hours) => coordinator.add(Task::new(title).with_due_date(Utc::now() + Duration::hours(hours))).await,
            Err(err) => Completion::failure(format!("Invalid number of hours {:?}: {}", hours, err)),
        },
        ["done", id] => coordinator.complete(&TaskId::from(*id)).await,
        ["undo", id] => coordinator.uncomplete(&TaskId::from(*id)).await,
        ["rm", id] => coordinator.delete(&TaskId::from(*id)).await,
        ["grades"] => {
            let book = GradeBook::new(Arc::clone(&settings));
            for entry in book.entries() {
                campus_planner::utils::print_grade(&entry);
            }
            for (course, average) in book.averages_by_course() {
                match average {
                    Some(average) => println!("{}: {:.1}%", course, average),
                    None => println!("{}: no average yet", course),
                }
            }
            Completion::success()
        },
        ["grade", course, title, score, max, rest @ ..] if rest.len() <= 1 => {
            record_grade(&GradeBook::new(Arc::clone(&settings)), course, title, score, max, rest.first().copied())
        },
        _ => {
            println!("{}", USAGE);
            Completion::failure("Invalid command")
        },
    };

    if let Some(err) = completion.error() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn record_grade(book: &GradeBook<FileStore>, course: &str, title: &str, score: &str, max: &str, weight: Option<&str>) -> Completion {
    let parse = |value: &str| value.parse::<f64>().map_err(|err| format!("Invalid number {:?}: {}", value, err));

    let entry = match (parse(score), parse(max), weight.map(parse).transpose()) {
        (Ok(score), Ok(max), Ok(weight)) => {
            let entry = GradeEntry::new(course, title, score, max);
            match weight {
                Some(weight) => entry.with_weight(weight),
                None => entry,
            }
        },
        (Err(err), _, _) | (_, Err(err), _) | (_, _, Err(err)) => return Completion::failure(err),
    };
    book.add(entry).into()
}
