//! User profile model.
//!
//! Profiles carry the account-level skill set used as a fallback when a
//! team-membership record declares no skills of its own.

use serde::{Deserialize, Serialize};

/// Account-level profile for a portal user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        UserProfile {
            user_id: user_id.into(),
            name: name.into(),
            skills: Vec::new(),
        }
    }
}
