//! Team management commands for CLI.

use campushub_core::storage::PortalDb;
use campushub_core::{Team, TeamMember};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum TeamAction {
    /// Create a new team under an event
    Create {
        /// Owning event ID
        event_id: String,
        /// Team name
        name: String,
    },
    /// List teams of an event
    List {
        /// Event ID
        event_id: String,
    },
    /// Add (or update) a member on a team
    AddMember {
        /// Team ID
        team_id: String,
        /// Member's user ID
        user_id: String,
        /// Member's display name
        name: String,
        /// Comma-separated skills declared on this membership
        #[arg(long)]
        skills: Option<String>,
    },
}

pub fn run(action: TeamAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PortalDb::open()?;

    match action {
        TeamAction::Create { event_id, name } => {
            let team = Team::new(event_id, name);
            db.create_team(&team)?;
            println!("Team created: {}", team.id);
            println!("{}", serde_json::to_string_pretty(&team)?);
        }
        TeamAction::List { event_id } => {
            let teams = db.list_teams(&event_id)?;
            println!("{}", serde_json::to_string_pretty(&teams)?);
        }
        TeamAction::AddMember {
            team_id,
            user_id,
            name,
            skills,
        } => {
            let member = TeamMember {
                user_id,
                team_id,
                name,
                skills: skills
                    .map(|s| s.split(',').map(|v| v.trim().to_string()).collect())
                    .unwrap_or_default(),
            };
            db.add_member(&member)?;
            println!("Member added: {}", member.user_id);
            println!("{}", serde_json::to_string_pretty(&member)?);
        }
    }

    Ok(())
}
