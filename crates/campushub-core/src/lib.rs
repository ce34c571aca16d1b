//! # CampusHub Core Library
//!
//! Core business logic for the CampusHub event coordination portal.
//! The portal is CRUD-first: events own teams and tasks, teams own
//! members, and profiles carry account-level skills. The one algorithmic
//! component is the task allocation engine, which assigns an event's
//! unassigned tasks to team members by skill fit and live workload.
//!
//! ## Architecture
//!
//! - **Storage**: SQLite-based persistence for events, teams, members,
//!   profiles, and tasks, plus TOML-based configuration
//! - **Allocation**: capability index, workload snapshot, deterministic
//!   ranker, greedy assignment loop, and single-transaction batch persist
//!
//! ## Key Components
//!
//! - [`PortalDb`]: portal persistence
//! - [`Config`]: application configuration
//! - [`allocation::run_allocation`]: one full allocation pass for an event

pub mod allocation;
pub mod error;
pub mod event;
pub mod profile;
pub mod storage;
pub mod task;
pub mod team;

pub use allocation::{
    AllocationReport, AllocationRun, Assignment, MemberPool, TaskOutcome, WorkloadEntry,
    WorkloadSnapshot,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use event::Event;
pub use profile::UserProfile;
pub use storage::{Config, PortalDb, ServerConfig};
pub use task::{Task, TaskPriority};
pub use team::{Team, TeamMember};
