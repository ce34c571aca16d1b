//! Event management commands for CLI.

use campushub_core::storage::PortalDb;
use campushub_core::Event;
use chrono::{DateTime, Utc};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum EventAction {
    /// Create a new event
    Create {
        /// Event name
        name: String,
        /// Event description
        #[arg(long)]
        description: Option<String>,
        /// Start timestamp (RFC3339)
        #[arg(long)]
        starts_at: Option<String>,
    },
    /// List events
    List,
    /// Get event details
    Get {
        /// Event ID
        id: String,
    },
}

pub fn run(action: EventAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PortalDb::open()?;

    match action {
        EventAction::Create {
            name,
            description,
            starts_at,
        } => {
            let mut event = Event::new(name);
            event.description = description;
            if let Some(raw) = starts_at {
                let parsed = DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| format!("invalid --starts-at: {e}"))?;
                event.starts_at = Some(parsed.with_timezone(&Utc));
            }
            db.create_event(&event)?;
            println!("Event created: {}", event.id);
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        EventAction::List => {
            let events = db.list_events()?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        EventAction::Get { id } => match db.get_event(&id)? {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("Event not found: {id}"),
        },
    }

    Ok(())
}
