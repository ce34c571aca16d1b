//! Task allocation engine.
//!
//! Given the unassigned tasks of one event, the engine assigns each task to
//! the best-fitting member of the task's team, balancing declared skills
//! against live workload, then persists every decision as a single batch.
//!
//! The run is one synchronous pass: store reads, a greedy in-memory loop,
//! and one multi-record write. The workload accumulator is an explicit
//! value passed through the loop, so the loop itself is testable without a
//! database.

pub mod capability;
pub mod engine;
pub mod guard;
pub mod ranker;
pub mod workload;

pub use capability::{build_pool, referenced_team_ids, Candidate, MemberPool};
pub use engine::{allocate, run_allocation, AllocationReport, AllocationRun, Assignment, TaskOutcome};
pub use guard::EventGuard;
pub use workload::{WorkloadEntry, WorkloadSnapshot};
