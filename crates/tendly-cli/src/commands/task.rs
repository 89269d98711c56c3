use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use tendly_core::{NewTask, Priority, TaskCategory, TaskPatch, TaskStatus};

use super::{finish, open_engine, print_json, CliResult};

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (end of that day, UTC).
fn parse_due(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("'{s}' is neither RFC 3339 nor YYYY-MM-DD"))
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// work, personal, health or learning
        #[arg(long, default_value = "personal")]
        category: TaskCategory,
        /// Due date (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Estimated focus minutes
        #[arg(long)]
        estimate: Option<u32>,
    },
    /// List tasks
    List {
        /// Include archived tasks
        #[arg(long)]
        all: bool,
        /// Only pending, completed or archived
        #[arg(long)]
        status: Option<String>,
    },
    /// Show a single task
    Get {
        id: String,
    },
    /// Update task fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        category: Option<TaskCategory>,
        #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
        due: Option<DateTime<Utc>>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        /// Replace tags (repeatable)
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
        #[arg(long)]
        estimate: Option<u32>,
    },
    /// Complete a task (no-op if already completed)
    Complete {
        id: String,
    },
    /// Complete a pending task or undo a completion
    Toggle {
        id: String,
    },
    /// Archive a task
    Archive {
        id: String,
    },
    /// Delete a task and its plant
    Delete {
        id: String,
    },
}

fn status_filter(status: Option<&str>) -> Result<Option<TaskStatus>, String> {
    match status.map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(s) if s == "pending" => Ok(Some(TaskStatus::Pending)),
        Some(s) if s == "completed" => Ok(Some(TaskStatus::Completed)),
        Some(s) if s == "archived" => Ok(Some(TaskStatus::Archived)),
        Some(other) => Err(format!("unknown status: {other}")),
    }
}

pub fn run(action: TaskAction) -> CliResult {
    let mut engine = open_engine()?;

    match action {
        TaskAction::Create {
            title,
            description,
            priority,
            category,
            due,
            tags,
            estimate,
        } => {
            let task = engine.create_task(NewTask {
                title,
                description,
                priority,
                category,
                due_date: due,
                tags,
                estimated_focus_minutes: estimate,
            })?;
            print_json(&task)?;
        }
        TaskAction::List { all, status } => {
            let filter = status_filter(status.as_deref())?;
            let tasks: Vec<_> = engine
                .tasks()
                .iter()
                .filter(|t| match filter {
                    Some(status) => t.status == status,
                    None => all || !t.is_archived(),
                })
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Get { id } => match engine.task(&id) {
            Some(task) => print_json(task)?,
            None => return Err(format!("task not found: {id}").into()),
        },
        TaskAction::Update {
            id,
            title,
            description,
            priority,
            category,
            due,
            clear_due,
            tags,
            estimate,
        } => {
            let due_date = if clear_due { Some(None) } else { due.map(Some) };
            let patch = TaskPatch {
                title,
                description,
                priority,
                category,
                due_date,
                tags,
                estimated_focus_minutes: estimate.map(Some),
            };
            let task = engine.update_task(&id, patch)?;
            print_json(&task)?;
        }
        TaskAction::Complete { id } => {
            let task = engine.complete_task(&id)?;
            print_json(&task)?;
        }
        TaskAction::Toggle { id } => {
            let task = engine.toggle_task_completion(&id)?;
            print_json(&task)?;
        }
        TaskAction::Archive { id } => {
            let task = engine.archive_task(&id)?;
            print_json(&task)?;
        }
        TaskAction::Delete { id } => {
            let task = engine.delete_task(&id)?;
            eprintln!("Task deleted: {}", task.title);
        }
    }

    finish(&mut engine);
    Ok(())
}
