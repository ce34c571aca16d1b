mod config;
pub mod migrations;
pub mod portal_db;

pub use config::{Config, ServerConfig};
pub use portal_db::PortalDb;

use std::path::PathBuf;

/// Returns `~/.config/campushub[-dev]/` based on CAMPUSHUB_ENV.
///
/// Set CAMPUSHUB_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CAMPUSHUB_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("campushub-dev")
    } else {
        base_dir.join("campushub")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
