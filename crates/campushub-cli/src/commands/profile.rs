//! User profile commands for CLI.

use campushub_core::storage::PortalDb;
use campushub_core::UserProfile;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create or replace a profile with its account-level skills
    Set {
        /// User ID
        user_id: String,
        /// Display name
        name: String,
        /// Comma-separated skills
        #[arg(long)]
        skills: Option<String>,
    },
    /// Get a profile
    Get {
        /// User ID
        user_id: String,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PortalDb::open()?;

    match action {
        ProfileAction::Set {
            user_id,
            name,
            skills,
        } => {
            let mut profile = UserProfile::new(user_id, name);
            profile.skills = skills
                .map(|s| s.split(',').map(|v| v.trim().to_string()).collect())
                .unwrap_or_default();
            db.upsert_profile(&profile)?;
            println!("Profile saved: {}", profile.user_id);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileAction::Get { user_id } => match db.get_profile(&user_id)? {
            Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
            None => println!("Profile not found: {user_id}"),
        },
    }

    Ok(())
}
