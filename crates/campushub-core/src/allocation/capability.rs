//! Capability index: the candidate pool for one allocation run.
//!
//! Resolves, for the teams referenced by a task batch, each team's members
//! together with their effective skill sets. A membership record with no
//! skills of its own falls back to the member's profile-level skills.

use std::collections::HashMap;

use crate::team::Team;

/// A team member as seen by the allocation engine: membership identity plus
/// the effective skill set after profile fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub user_id: String,
    pub team_id: String,
    pub name: String,
    pub skills: Vec<String>,
}

/// Candidate pool for one run.
///
/// Order is significant: team order as supplied, members in team insertion
/// order. The ranker's final tie-break is this order, so it must stay
/// stable across the run.
#[derive(Debug, Clone, Default)]
pub struct MemberPool {
    pub members: Vec<Candidate>,
}

impl MemberPool {
    /// Members belonging to the given team, in pool order.
    pub fn team_members(&self, team_id: &str) -> Vec<&Candidate> {
        self.members
            .iter()
            .filter(|m| m.team_id == team_id)
            .collect()
    }

    /// Distinct user ids in pool order.
    pub fn user_ids(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for member in &self.members {
            if !seen.contains(&member.user_id) {
                seen.push(member.user_id.clone());
            }
        }
        seen
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Distinct team ids referenced by a task batch, in first-seen order.
pub fn referenced_team_ids<'a, I>(team_ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids: Vec<String> = Vec::new();
    for id in team_ids {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Build the candidate pool from resolved teams plus profile-level skills.
///
/// `profile_skills` maps user id to account-level skills; it is consulted
/// only for members whose membership record carries no skills. A team with
/// zero members simply contributes nothing.
pub fn build_pool(teams: &[Team], profile_skills: &HashMap<String, Vec<String>>) -> MemberPool {
    let mut members = Vec::new();
    for team in teams {
        for member in &team.members {
            let skills = if member.skills.is_empty() {
                profile_skills
                    .get(&member.user_id)
                    .cloned()
                    .unwrap_or_default()
            } else {
                member.skills.clone()
            };
            members.push(Candidate {
                user_id: member.user_id.clone(),
                team_id: member.team_id.clone(),
                name: member.name.clone(),
                skills,
            });
        }
    }
    MemberPool { members }
}
