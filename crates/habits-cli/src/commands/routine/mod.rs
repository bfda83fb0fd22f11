//! Routine commands
//!
//! Commands for managing routines: list, add, update, delete, today.

pub mod helpers;
mod mutations;
mod queries;
mod types;

use anyhow::Result;

use crate::commands::Context;

// Re-export public types
pub use types::{DueRow, FrequencyArg, KindArg, RoutineAction, RoutineRow};

pub async fn execute(ctx: &Context, action: RoutineAction) -> Result<()> {
    match action {
        RoutineAction::List => queries::list_routines(ctx).await,
        RoutineAction::Today { date } => queries::show_today(ctx, date).await,
        RoutineAction::Add { name, icon, kind, goal, frequency, every, days, tags } => {
            let req = helpers::build_create(name, icon, kind, goal, frequency, every, days, tags)?;
            mutations::add_routine(ctx, req).await
        }
        RoutineAction::Update { id, name, icon, kind, goal, frequency, every, days, tags, clear_tags } => {
            let req = helpers::build_update(name, icon, kind, goal, frequency, every, days, tags, clear_tags)?;
            mutations::update_routine(ctx, id, req).await
        }
        RoutineAction::Delete { id, force } => mutations::delete_routine(ctx, id, force).await,
    }
}
