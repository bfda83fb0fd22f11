//! Stats routine command
//!
//! Recorded values of a single routine over a window.

use anyhow::Result;

use super::types::SeriesRow;
use super::window;
use crate::commands::routine::helpers::resolve_routine_id;
use crate::commands::Context;
use crate::output::{print_heading, print_json, print_output, OutputFormat};
use habits_core::services::load_stats;

pub async fn show_routine(ctx: &Context, id: String, days: Option<i64>, end: Option<String>) -> Result<()> {
    let (days, end) = window(days, end)?;
    let user = ctx.current_user().await?;
    let routine_id = resolve_routine_id(&ctx.db, &user.id, &id).await?;
    let stats = load_stats(&ctx.db.pool, &user.id, days, Some(&routine_id), end).await?;

    let selected = stats
        .selected_routine
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Routine not found: {}", id))?;

    if ctx.format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "selectedRoutine": selected,
            "routineData": stats.routine_data,
        }));
    }

    print_heading(&format!("{} ({}, last {} days to {})", selected.name, selected.routine_type, days, end));
    let rows: Vec<SeriesRow> = stats.routine_data.iter().map(SeriesRow::from).collect();
    print_output(&rows, ctx.format)
}
