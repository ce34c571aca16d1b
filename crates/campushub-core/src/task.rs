//! Task model.
//!
//! Tasks belong to an event and a team. They are created unassigned; the
//! allocation engine (or a manual edit through the CRUD layer) fills in the
//! assignee fields. `ai_assigned` marks assignments produced by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// A unit of event work, assignable to a single team member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Owning event
    pub event_id: String,
    /// Owning team; the assignee must belong to this team
    pub team_id: String,
    /// Task title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Skills needed to do the task well (may be empty)
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// Priority
    #[serde(default)]
    pub priority: TaskPriority,
    /// Assigned member's user id (absent until assigned)
    pub assigned_to: Option<String>,
    /// Assigned member's display name (denormalized for display)
    pub assigned_name: Option<String>,
    /// True when the assignment was produced by the allocation engine
    #[serde(default)]
    pub ai_assigned: bool,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
    /// Due date
    pub due_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new unassigned task.
    pub fn new(
        event_id: impl Into<String>,
        team_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            team_id: team_id.into(),
            title: title.into(),
            description: None,
            required_skills: Vec::new(),
            priority: TaskPriority::Medium,
            assigned_to: None,
            assigned_name: None,
            ai_assigned: false,
            completed: false,
            due_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An open task counts against its assignee's workload.
    pub fn is_open(&self) -> bool {
        !self.completed
    }
}
