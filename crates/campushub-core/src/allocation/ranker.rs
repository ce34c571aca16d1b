//! Eligibility filter and candidate ranking.
//!
//! Ranking is a deterministic total order over the eligible members of a
//! task's team:
//!
//! 1. skill-match count, descending (required skills found in the member's
//!    effective skill set)
//! 2. current open-task count, ascending
//! 3. pool order as produced by the capability index (stable; no further
//!    criterion)
//!
//! Skill fit outranks raw load so an unqualified-but-idle member is not
//! preferred over a qualified busy one; load spreads work across equally
//! qualified members.

use super::capability::{Candidate, MemberPool};
use super::workload::WorkloadSnapshot;

/// Number of the task's required skills present in the member's skill set.
///
/// Exact string membership; duplicate entries in the requirement list each
/// count against the same skill.
pub fn skill_match(required_skills: &[String], member_skills: &[String]) -> usize {
    required_skills
        .iter()
        .filter(|required| member_skills.iter().any(|skill| skill == *required))
        .count()
}

/// Members of the pool eligible for a task: those on the task's team.
pub fn eligible<'a>(pool: &'a MemberPool, team_id: &str) -> Vec<&'a Candidate> {
    pool.team_members(team_id)
}

/// The single top-ranked candidate, or `None` when no one is eligible.
///
/// Strict comparisons keep the first-seen candidate on full ties, so the
/// result is stable with respect to pool order.
pub fn pick_best<'a>(
    candidates: &[&'a Candidate],
    required_skills: &[String],
    workload: &WorkloadSnapshot,
) -> Option<&'a Candidate> {
    let mut best: Option<(&Candidate, usize, u32)> = None;

    for &candidate in candidates {
        let matches = skill_match(required_skills, &candidate.skills);
        let load = workload.open_tasks(&candidate.user_id);

        let better = match best {
            None => true,
            Some((_, best_matches, best_load)) => {
                matches > best_matches || (matches == best_matches && load < best_load)
            }
        };
        if better {
            best = Some((candidate, matches, load));
        }
    }

    best.map(|(candidate, _, _)| candidate)
}
