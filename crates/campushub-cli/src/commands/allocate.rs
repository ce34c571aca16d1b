//! Allocation command for CLI.

use campushub_core::allocation::{run_allocation, AllocationRun};
use campushub_core::storage::PortalDb;

pub fn run(event_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = PortalDb::open()?;

    match run_allocation(&db, event_id)? {
        AllocationRun::NothingToAssign => {
            println!("No unassigned tasks for event {event_id}");
        }
        AllocationRun::Completed(report) => {
            let assignments = report.assignments();
            println!(
                "Assigned {} task(s), skipped {}",
                assignments.len(),
                report.skipped_count()
            );
            println!("{}", serde_json::to_string_pretty(&report.outcomes)?);
        }
    }

    Ok(())
}
