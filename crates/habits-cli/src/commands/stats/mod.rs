//! Stats commands
//!
//! CLI commands for completion statistics and visualizations.

mod daily;
mod profile;
mod routine;
mod types;

use anyhow::Result;

use crate::commands::Context;

// Re-export public types
pub use types::{DailyRow, SeriesRow, StatsAction, StatsRow};

pub async fn execute(ctx: &Context, action: StatsAction) -> Result<()> {
    match action {
        StatsAction::Daily { days, end } => daily::show_daily(ctx, days, end).await,
        StatsAction::Routine { id, days, end } => routine::show_routine(ctx, id, days, end).await,
        StatsAction::Profile => profile::show_profile(ctx).await,
    }
}

/// Parse the shared `--days` / `--end` options
fn window(days: Option<i64>, end: Option<String>) -> Result<(u32, chrono::NaiveDate)> {
    let days = habits_core::services::validate_days(days)?;
    let end = habits_core::services::normalize_day(end.as_deref())?;
    Ok((days, end))
}
