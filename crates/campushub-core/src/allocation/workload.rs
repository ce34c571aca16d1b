//! Workload snapshot: per-member open-task counters for one run.
//!
//! Built once from the store at the start of a batch, then mutated in
//! memory by the greedy loop so later tasks in the same batch see the
//! effect of earlier assignments. Never persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::task::TaskPriority;

/// Open-task counters for one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkloadEntry {
    /// Incomplete tasks currently assigned to the member, across all events
    pub open_tasks: u32,
    /// Subset of `open_tasks` with High priority
    pub open_high_priority: u32,
}

/// Per-member workload counters, scoped to one allocation run.
///
/// Every candidate gets an explicit entry (zero when the store reports no
/// open tasks), so lookups never need null handling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkloadSnapshot {
    entries: HashMap<String, WorkloadEntry>,
}

impl WorkloadSnapshot {
    /// Build a snapshot for the given candidates from store-reported counts.
    ///
    /// Candidates absent from `counts` get a zero entry; counts for users
    /// outside the candidate set are dropped.
    pub fn build<'a, I>(candidate_ids: I, counts: &HashMap<String, WorkloadEntry>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = HashMap::new();
        for id in candidate_ids {
            let entry = counts.get(id).copied().unwrap_or_default();
            entries.insert(id.to_string(), entry);
        }
        WorkloadSnapshot { entries }
    }

    /// Counters for a member. Unknown members read as zero.
    pub fn entry(&self, user_id: &str) -> WorkloadEntry {
        self.entries.get(user_id).copied().unwrap_or_default()
    }

    /// Open-task count for a member (the ranker's secondary key).
    pub fn open_tasks(&self, user_id: &str) -> u32 {
        self.entry(user_id).open_tasks
    }

    /// Record an in-batch assignment so later tasks see the new load.
    pub fn record_assignment(&mut self, user_id: &str, priority: TaskPriority) {
        let entry = self.entries.entry(user_id.to_string()).or_default();
        entry.open_tasks += 1;
        if priority == TaskPriority::High {
            entry.open_high_priority += 1;
        }
    }

    /// Number of tracked members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
