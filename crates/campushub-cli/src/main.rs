use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "campushub-cli", version, about = "CampusHub CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Event management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Team management
    Team {
        #[command(subcommand)]
        action: commands::team::TeamAction,
    },
    /// User profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Run the task allocation engine for an event
    Allocate {
        /// Event ID
        event_id: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Event { action } => commands::event::run(action),
        Commands::Team { action } => commands::team::run(action),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Allocate { event_id } => commands::allocate::run(&event_id),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
