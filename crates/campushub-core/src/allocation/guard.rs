//! Per-event single-flight guard for allocation runs.
//!
//! Two concurrent runs against the same event would race on the shared
//! "unassigned" filter and each other's workload snapshots, so the second
//! caller fails fast with `RunInProgress` instead. The guard is
//! process-local; runs in separate processes still rely on the unassigned
//! filter for idempotency.

use std::sync::Mutex;

use crate::error::{CoreError, Result};

static IN_FLIGHT: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// RAII token for an exclusive allocation run on one event.
///
/// Released on drop.
#[derive(Debug)]
pub struct EventGuard {
    event_id: String,
}

impl EventGuard {
    /// Claim the event, failing if a run is already in flight for it.
    pub fn acquire(event_id: &str) -> Result<Self> {
        let mut in_flight = IN_FLIGHT
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if in_flight.iter().any(|id| id == event_id) {
            return Err(CoreError::RunInProgress {
                event_id: event_id.to_string(),
            });
        }
        in_flight.push(event_id.to_string());
        Ok(EventGuard {
            event_id: event_id.to_string(),
        })
    }
}

impl Drop for EventGuard {
    fn drop(&mut self) {
        let mut in_flight = IN_FLIGHT
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight.retain(|id| id != &self.event_id);
    }
}
