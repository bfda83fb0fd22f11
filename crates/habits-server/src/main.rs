//! Habits server - JSON API over routines, progress and statistics

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use habits_core::Database;

#[derive(Parser)]
#[command(name = "habits-server")]
#[command(author, version, about = "Habit tracking HTTP API", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "HABITS_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Override database path (or set HABITS_DB_PATH env var)
    #[arg(long, env = "HABITS_DB_PATH")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let db = match args.db {
        Some(path) => Database::open(path).await?,
        None => Database::new().await?,
    };

    let app = habits_server::create_router(db);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    log::info!("Habits API v{} listening on {}", habits_core::version(), args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
