//! # habits-core
//!
//! Core logic for Habits - shared between the CLI and the HTTP server.
//!
//! This crate provides:
//! - Database operations (`db` module)
//! - Data models (`models` module)
//! - Recurrence, completion, progress and statistics services (`services` module)
//! - Identity tokens (`auth` module)
//! - Unified error handling (`error` module)

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

// Re-exports for convenience
pub use db::Database;
pub use error::{Error, Result};

// Re-export commonly used types from models
pub use models::{
    Claims, CreateRoutine, Frequency, ProgressRecord, ProgressUpdate, RecordProgress, Routine,
    RoutineResponse, RoutineType, Tag, UpdateProfile, UpdateRoutine, User,
};

// Re-export commonly used types from services
pub use services::{
    build_daily_series, build_series, build_stats, current_streak, find_progress, is_completed,
    is_due, load_stats, normalize_day, profile_stats, routines_for_date, upsert_progress,
    DailyPoint, DayOverview, ProfileStats, ProgressFilter, RoutineStore, SeriesPoint,
    SeriesValue, StatsResponse,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
