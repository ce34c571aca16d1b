//! Team and team membership models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member of a team, annotated with the skills declared on the
/// membership record. An empty skill list means the member's profile-level
/// skills apply instead (resolved by the capability index).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamMember {
    pub user_id: String,
    pub team_id: String,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A team organizing part of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub event_id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team with a generated id and no members.
    pub fn new(event_id: impl Into<String>, name: impl Into<String>) -> Self {
        Team {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            name: name.into(),
            members: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
