//! Database module - SQLx with SQLite

use crate::error::{Error, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::path::PathBuf;
use std::str::FromStr;

/// Database state
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Create a new database connection with default path
    pub async fn new() -> Result<Self> {
        let db_path = get_db_path()?;
        Self::open(db_path).await
    }

    /// Create a new database connection with a specific path
    pub async fn open(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        log::info!("Connecting to database: {}", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Open a private in-memory database (tests, dry runs)
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // A single long-lived connection: every new in-memory connection is a fresh database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        log::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                name TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS routines (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                icon TEXT,
                routine_type TEXT NOT NULL DEFAULT 'BOOLEAN',
                goal INTEGER DEFAULT 1,
                frequency TEXT NOT NULL DEFAULT 'DAILY',
                every_n_days INTEGER,
                week_days TEXT NOT NULL DEFAULT '[]',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_routines_user_id ON routines(user_id, created_at)")
            .execute(&self.pool)
            .await?;

        // Tags are shared by name across routines
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS routine_tags (
                routine_id TEXT NOT NULL,
                tag_id TEXT NOT NULL,
                PRIMARY KEY (routine_id, tag_id),
                FOREIGN KEY (routine_id) REFERENCES routines(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // At most one progress row per (routine, user, day)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS progress (
                id TEXT PRIMARY KEY,
                routine_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                date DATE NOT NULL,
                boolean_value BOOLEAN,
                numeric_value REAL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (routine_id) REFERENCES routines(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE(routine_id, user_id, date)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_progress_user_date ON progress(user_id, date)")
            .execute(&self.pool)
            .await?;

        log::info!("Database migrations completed");
        Ok(())
    }
}

/// Get database file path
/// Priority: HABITS_DB_PATH env var > default app data directory
pub fn get_db_path() -> Result<PathBuf> {
    // Check for environment variable override
    if let Ok(path) = std::env::var("HABITS_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    // Default: use app data directory
    let dirs = directories::ProjectDirs::from("com", "habits", "Habits")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().join("habits.db"))
}
