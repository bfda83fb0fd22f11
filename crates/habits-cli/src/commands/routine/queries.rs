//! Routine query commands
//!
//! Read operations for routines.

use anyhow::Result;

use super::types::{DueRow, RoutineRow};
use crate::commands::Context;
use crate::output::{print_info, print_json, print_output, OutputFormat};
use habits_core::services::{normalize_day, routines_for_date, weekday_index, weekday_label, RoutineStore};

pub async fn list_routines(ctx: &Context) -> Result<()> {
    let user = ctx.current_user().await?;
    let routines = RoutineStore::new(ctx.db.pool.clone()).list_with_tags(&user.id).await?;

    match ctx.format {
        OutputFormat::Json => print_json(&routines)?,
        OutputFormat::Table => {
            if routines.is_empty() {
                print_info("No routines yet. Use 'habits routine add <name>' to create one.", ctx.quiet);
            } else {
                let rows: Vec<RoutineRow> = routines.iter().map(RoutineRow::from).collect();
                print_output(&rows, ctx.format)?;
            }
        }
    }

    Ok(())
}

pub async fn show_today(ctx: &Context, date: Option<String>) -> Result<()> {
    let date = normalize_day(date.as_deref())?;
    let user = ctx.current_user().await?;
    let overview = routines_for_date(&ctx.db.pool, &user.id, date).await?;

    match ctx.format {
        OutputFormat::Json => print_json(&overview)?,
        OutputFormat::Table => {
            print_info(
                &format!(
                    "{} ({}): {}/{} done",
                    overview.date,
                    weekday_label(weekday_index(overview.date)),
                    overview.completed,
                    overview.total
                ),
                ctx.quiet,
            );
            if overview.routines.is_empty() {
                print_info("Nothing due.", ctx.quiet);
            } else {
                let rows: Vec<DueRow> = overview.routines.iter().map(DueRow::from).collect();
                print_output(&rows, ctx.format)?;
            }
        }
    }

    Ok(())
}
