//! campushub-server: HTTP surface for the CampusHub portal.
//!
//! Exposes the task allocation action and a health probe:
//!
//!   POST /api/v1/events/{id}/allocate
//!   GET  /api/v1/health
//!
//! The allocation route sits behind bearer-token auth; the organizer role
//! itself is certified upstream by the portal's auth layer, this binary
//! only checks the configured token.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use campushub_core::storage::{Config, PortalDb};

mod auth;
mod routes;

/// Shared server state.
pub struct AppState {
    /// Store handle. Allocation runs are blocking and sequential; the lock
    /// serializes handlers over the single connection.
    pub db: Mutex<PortalDb>,
    /// Expected bearer token; empty disables the check.
    pub api_token: String,
}

#[derive(Parser)]
#[command(name = "campushub-server", version, about = "CampusHub HTTP server")]
struct Args {
    /// Bind address (overrides config.toml)
    #[arg(long)]
    bind: Option<String>,
    /// Port (overrides config.toml)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load_or_default();
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let port = args.port.unwrap_or(config.server.port);

    let db = PortalDb::open()?;
    let state = Arc::new(AppState {
        db: Mutex::new(db),
        api_token: config.server.api_token.clone(),
    });

    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let router = routes::build_router(state);

    info!("CampusHub API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
