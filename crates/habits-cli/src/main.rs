//! Habits CLI - routines, daily progress and statistics
//!
//! A command-line interface for managing users and routines, recording
//! progress, and viewing completion statistics.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "habits")]
#[command(author, version, about = "Habit tracking CLI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Override database path (or set HABITS_DB_PATH env var)
    #[arg(long, env = "HABITS_DB_PATH", global = true)]
    db: Option<String>,

    /// Act as this user (email); defaults to the first user
    #[arg(long, short, env = "HABITS_USER", global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users and their access tokens
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },

    /// Manage routines
    Routine {
        #[command(subcommand)]
        action: commands::routine::RoutineAction,
    },

    /// Show and record daily progress
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },

    /// Completion statistics and visualizations
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Set up database path if provided
    if let Some(db_path) = &cli.db {
        std::env::set_var("HABITS_DB_PATH", db_path);
    }

    // Initialize database
    let db = habits_core::Database::new().await?;

    // Create context for commands
    let ctx = commands::Context {
        db,
        format: cli.format,
        quiet: cli.quiet,
        user: cli.user,
    };

    // Execute command
    match cli.command {
        Commands::User { action } => commands::user::execute(&ctx, action).await,
        Commands::Routine { action } => commands::routine::execute(&ctx, action).await,
        Commands::Progress { action } => commands::progress::execute(&ctx, action).await,
        Commands::Stats { action } => commands::stats::execute(&ctx, action).await,
    }
}
