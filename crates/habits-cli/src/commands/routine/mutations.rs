//! Routine mutation commands
//!
//! Create, update, and delete operations for routines.

use anyhow::Result;

use super::helpers::resolve_routine_id;
use super::types::RoutineRow;
use crate::commands::{short_id, Context};
use crate::output::{print_error, print_json, print_single, OutputFormat};
use habits_core::models::{CreateRoutine, RoutineResponse, UpdateRoutine};
use habits_core::services::RoutineStore;

pub async fn add_routine(ctx: &Context, req: CreateRoutine) -> Result<()> {
    let user = ctx.current_user().await?;
    let routine = RoutineStore::new(ctx.db.pool.clone()).create(&user.id, req).await?;

    ctx.success(&format!("Created routine: {}", short_id(&routine.id)));
    show(ctx, &routine)
}

pub async fn update_routine(ctx: &Context, id: String, req: UpdateRoutine) -> Result<()> {
    let user = ctx.current_user().await?;
    let full_id = resolve_routine_id(&ctx.db, &user.id, &id).await?;
    let routine = RoutineStore::new(ctx.db.pool.clone()).update(&user.id, &full_id, req).await?;

    ctx.success(&format!("Updated routine: {}", short_id(&routine.id)));
    show(ctx, &routine)
}

pub async fn delete_routine(ctx: &Context, id: String, force: bool) -> Result<()> {
    let user = ctx.current_user().await?;
    let full_id = resolve_routine_id(&ctx.db, &user.id, &id).await?;
    let store = RoutineStore::new(ctx.db.pool.clone());

    if !force {
        // Show routine before deletion
        let routine = store.get(&user.id, &full_id).await?;
        let tags = store.tags_for(&full_id).await?;
        print_single(&RoutineRow::from(&RoutineResponse::new(routine, tags)), ctx.format)?;
        print_error("Use --force to confirm deletion (progress history is deleted too)");
        return Ok(());
    }

    store.delete(&user.id, &full_id).await?;
    ctx.success(&format!("Deleted routine: {}", short_id(&full_id)));

    Ok(())
}

fn show(ctx: &Context, routine: &RoutineResponse) -> Result<()> {
    if ctx.quiet {
        return Ok(());
    }
    match ctx.format {
        OutputFormat::Json => print_json(routine),
        OutputFormat::Table => print_single(&RoutineRow::from(routine), ctx.format),
    }
}
