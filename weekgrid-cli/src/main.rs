mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use weekgrid_core::config::WeekgridConfig;
use weekgrid_core::reconcile::ReconciliationService;
use weekgrid_core::store::JsonFileStore;

#[derive(Parser)]
#[command(name = "weekgrid")]
#[command(about = "Plan your week: events, tasks and external calendar sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new event
    New {
        /// Event title (prompted for when omitted)
        title: Option<String>,

        /// Day (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Start time (HH:MM)
        #[arg(short, long)]
        time: Option<String>,

        /// Length (e.g. "45m", "1h 30m")
        #[arg(long)]
        duration: Option<String>,

        /// Where the event takes place
        #[arg(short, long)]
        location: Option<String>,

        /// Repeat rule: daily, weekly, weekdays or monthly
        #[arg(short, long)]
        repeat: Option<String>,

        /// Last day the repeat applies (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
    },
    /// List all persisted events
    Events,
    /// Show one day as a lane-packed grid
    Day {
        /// Day to show (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },
    /// Move an event to a new day and/or time
    Move {
        /// Event id (or unique prefix)
        id: String,

        /// New day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// New start time (HH:MM)
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Ingest a sync batch file (JSON array of gateway records)
    Sync {
        /// Path to the batch file
        file: PathBuf,
    },
    /// Manage tasks
    #[command(subcommand)]
    Task(commands::task::TaskCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = WeekgridConfig::load()?;
    let store = JsonFileStore::new(config.data_dir.clone());
    let service = ReconciliationService::new(store.clone());

    match cli.command {
        Commands::New {
            title,
            date,
            time,
            duration,
            location,
            repeat,
            until,
        } => commands::new::run(&service, title, date, time, duration, location, repeat, until).await,
        Commands::Events => commands::events::run(&service).await,
        Commands::Day { date } => commands::day::run(&service, &config, date.as_deref()).await,
        Commands::Move { id, date, time } => {
            commands::move_event::run(&service, &id, date.as_deref(), time.as_deref()).await
        }
        Commands::Sync { file } => commands::sync::run(&service, &file).await,
        Commands::Task(command) => commands::task::run(&service, &store, command).await,
    }
}
