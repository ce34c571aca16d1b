//! Task management commands for CLI.

use campushub_core::storage::PortalDb;
use campushub_core::{Task, TaskPriority};
use chrono::{DateTime, Utc};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Owning event ID
        event_id: String,
        /// Owning team ID
        team_id: String,
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated required skills
        #[arg(long)]
        skills: Option<String>,
        /// Priority: high, medium, or low (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Due date (RFC3339)
        #[arg(long)]
        due_at: Option<String>,
    },
    /// List tasks of an event
    List {
        /// Event ID
        event_id: String,
        /// Only unassigned, open tasks
        #[arg(long)]
        unassigned: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Mark a task as completed
    Complete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PortalDb::open()?;

    match action {
        TaskAction::Create {
            event_id,
            team_id,
            title,
            description,
            skills,
            priority,
            due_at,
        } => {
            let mut task = Task::new(event_id, team_id, title);
            task.description = description;
            task.required_skills = skills
                .map(|s| s.split(',').map(|v| v.trim().to_string()).collect())
                .unwrap_or_default();
            task.priority = match priority.as_str() {
                "high" => TaskPriority::High,
                "low" => TaskPriority::Low,
                _ => TaskPriority::Medium,
            };
            if let Some(raw) = due_at {
                let parsed = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| format!("invalid --due-at: {e}"))?;
                task.due_at = Some(parsed.with_timezone(&Utc));
            }
            db.create_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List {
            event_id,
            unassigned,
        } => {
            let tasks = if unassigned {
                db.unassigned_tasks(&event_id)?
            } else {
                db.list_tasks(&event_id)?
            };
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Get { id } => match db.get_task(&id)? {
            Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
            None => println!("Task not found: {id}"),
        },
        TaskAction::Complete { id } => {
            if db.complete_task(&id)? {
                println!("Task completed: {id}");
            } else {
                println!("Task not found: {id}");
            }
        }
    }

    Ok(())
}
