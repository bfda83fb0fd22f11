//! Stats daily command
//!
//! Completed vs. due routines for each day of a window.

use anyhow::Result;

use super::types::DailyRow;
use super::window;
use crate::commands::Context;
use crate::output::{print_heading, print_json, print_output, OutputFormat};
use habits_core::services::load_stats;

pub async fn show_daily(ctx: &Context, days: Option<i64>, end: Option<String>) -> Result<()> {
    let (days, end) = window(days, end)?;
    let user = ctx.current_user().await?;
    let stats = load_stats(&ctx.db.pool, &user.id, days, None, end).await?;

    if ctx.format == OutputFormat::Json {
        return print_json(&stats.daily_data);
    }

    print_heading(&format!("Daily completion (last {} days to {})", days, end));
    let rows: Vec<DailyRow> = stats.daily_data.iter().map(DailyRow::from).collect();
    print_output(&rows, ctx.format)?;

    let (completed, due) = stats
        .daily_data
        .iter()
        .fold((0u32, 0u32), |(c, t), p| (c + p.completed, t + p.total));
    let rate = if due > 0 { f64::from(completed) * 100.0 / f64::from(due) } else { 0.0 };

    println!("───────────────────────────────────────────────────────────────");
    println!(
        "Total: {}/{} done ({:.0}%) / streak {} day(s)",
        completed, due, rate, stats.streak
    );

    Ok(())
}
