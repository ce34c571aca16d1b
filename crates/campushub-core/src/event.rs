//! Event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A college event (fest, hackathon, workshop) that teams and tasks belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Event {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            starts_at: None,
            created_at: Utc::now(),
        }
    }
}
