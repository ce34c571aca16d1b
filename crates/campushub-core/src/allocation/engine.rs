//! Greedy assignment loop and allocation run orchestration.
//!
//! The loop walks the task batch strictly sequentially, in the batch's
//! retrieval order (`ORDER BY created_at, id` on the unassigned query).
//! Each assignment bumps the in-memory workload snapshot, so a member
//! chosen for an early task carries that load when later tasks are ranked.
//! Results are therefore order-sensitive; tests pin the order by
//! constructing the batch explicitly.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::storage::PortalDb;
use crate::task::Task;

use super::capability::{build_pool, referenced_team_ids, MemberPool};
use super::guard::EventGuard;
use super::ranker;
use super::workload::WorkloadSnapshot;

/// One allocation decision: task, chosen member, member display name.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Assignment {
    pub task_id: String,
    pub member_id: String,
    pub member_name: String,
}

/// Per-task outcome of a run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Task assigned to the top-ranked eligible member
    Assigned {
        task_id: String,
        member_id: String,
        member_name: String,
    },
    /// No member of the task's team was available; terminal for this run
    SkippedNoEligibleMember { task_id: String },
}

/// Finalized result of one allocation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AllocationReport {
    /// One entry per task, in batch order
    pub outcomes: Vec<TaskOutcome>,
    /// Workload counters after the batch, for observability
    pub workload: WorkloadSnapshot,
}

impl AllocationReport {
    /// The decisions to persist, in batch order.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                TaskOutcome::Assigned {
                    task_id,
                    member_id,
                    member_name,
                } => Some(Assignment {
                    task_id: task_id.clone(),
                    member_id: member_id.clone(),
                    member_name: member_name.clone(),
                }),
                TaskOutcome::SkippedNoEligibleMember { .. } => None,
            })
            .collect()
    }

    /// Tasks left unassigned because no team member was eligible.
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TaskOutcome::SkippedNoEligibleMember { .. }))
            .count()
    }
}

/// Result of one invocation of the engine.
#[derive(Debug)]
pub enum AllocationRun {
    /// The unassigned query returned no rows; no write was issued
    NothingToAssign,
    /// The batch was processed and all decisions persisted
    Completed(AllocationReport),
}

/// Run the greedy loop over a batch.
///
/// Pure over its inputs: the snapshot is taken by value, mutated as the
/// accumulator, and returned inside the report.
pub fn allocate(
    tasks: &[Task],
    pool: &MemberPool,
    mut workload: WorkloadSnapshot,
) -> AllocationReport {
    let mut outcomes = Vec::with_capacity(tasks.len());

    for task in tasks {
        let candidates = ranker::eligible(pool, &task.team_id);
        match ranker::pick_best(&candidates, &task.required_skills, &workload) {
            Some(winner) => {
                debug!(
                    task_id = %task.id,
                    member_id = %winner.user_id,
                    open_tasks = workload.open_tasks(&winner.user_id),
                    "assigned task"
                );
                workload.record_assignment(&winner.user_id, task.priority);
                outcomes.push(TaskOutcome::Assigned {
                    task_id: task.id.clone(),
                    member_id: winner.user_id.clone(),
                    member_name: winner.name.clone(),
                });
            }
            None => {
                debug!(task_id = %task.id, team_id = %task.team_id, "no eligible member, skipping");
                outcomes.push(TaskOutcome::SkippedNoEligibleMember {
                    task_id: task.id.clone(),
                });
            }
        }
    }

    AllocationReport { outcomes, workload }
}

/// Allocate every unassigned task of an event and persist the batch.
///
/// The whole run is one synchronous pass: read the batch, resolve the
/// candidate pool, snapshot workloads, run the loop, write all decisions in
/// one transaction. Store failures abort the run with no partial commit; a
/// re-run picks up whatever is still unassigned.
pub fn run_allocation(db: &PortalDb, event_id: &str) -> Result<AllocationRun> {
    if event_id.trim().is_empty() {
        return Err(ValidationError::MissingField("event_id").into());
    }

    let _guard = EventGuard::acquire(event_id)?;

    let tasks = db.unassigned_tasks(event_id)?;
    if tasks.is_empty() {
        info!(event_id, "no unassigned tasks");
        return Ok(AllocationRun::NothingToAssign);
    }

    let team_ids = referenced_team_ids(tasks.iter().map(|t| t.team_id.as_str()));
    let teams = db.teams_by_ids(&team_ids)?;

    // Profile fallback only for members whose membership declares no skills.
    let fallback_ids: Vec<String> = teams
        .iter()
        .flat_map(|team| team.members.iter())
        .filter(|member| member.skills.is_empty())
        .map(|member| member.user_id.clone())
        .collect();
    let profile_skills: HashMap<String, Vec<String>> = db.profile_skills_for(&fallback_ids)?;

    let pool = build_pool(&teams, &profile_skills);
    let candidate_ids = pool.user_ids();
    let counts = db.open_task_counts(&candidate_ids)?;
    let snapshot = WorkloadSnapshot::build(candidate_ids.iter().map(String::as_str), &counts);

    let report = allocate(&tasks, &pool, snapshot);

    let assignments = report.assignments();
    if !assignments.is_empty() {
        db.apply_assignments(&assignments)?;
    }
    info!(
        event_id,
        assigned = assignments.len(),
        skipped = report.skipped_count(),
        "allocation run complete"
    );

    Ok(AllocationRun::Completed(report))
}
