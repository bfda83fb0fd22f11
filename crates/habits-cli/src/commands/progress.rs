//! Progress commands
//!
//! Show and record progress for a day. Writes go through the same upsert the
//! server uses, so setting a value never clears the done flag and vice versa.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;

use super::routine::helpers::resolve_routine_id;
use super::{short_id, truncate, Context};
use crate::output::{print_json, print_output, print_single, OutputFormat};
use habits_core::models::{ProgressRecord, ProgressUpdate};
use habits_core::services::{find_progress, normalize_day, upsert_progress, ProgressFilter, RoutineStore};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show progress recorded on a day
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Only this routine (ID prefix)
        #[arg(short, long)]
        routine: Option<String>,
    },

    /// Record progress for a routine
    Set {
        /// Routine ID (prefix is enough)
        routine: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Mark as done
        #[arg(long, conflicts_with = "undone")]
        done: bool,

        /// Mark as not done
        #[arg(long)]
        undone: bool,

        /// Numeric value
        #[arg(short, long)]
        value: Option<f64>,
    },
}

/// Progress row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ProgressRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Routine")]
    pub routine: String,
    #[tabled(rename = "Done")]
    pub done: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Updated")]
    pub updated: String,
}

impl ProgressRow {
    fn new(record: &ProgressRecord, routine_name: &str) -> Self {
        Self {
            date: record.date.to_string(),
            routine: truncate(routine_name, 32),
            done: match record.boolean_value {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            }
            .to_string(),
            value: record
                .numeric_value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            updated: record.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Turn the flags into a partial write
pub fn build_update(done: bool, undone: bool, value: Option<f64>) -> ProgressUpdate {
    let boolean_value = match (done, undone) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    ProgressUpdate {
        boolean_value,
        numeric_value: value,
    }
}

pub async fn execute(ctx: &Context, action: ProgressAction) -> Result<()> {
    match action {
        ProgressAction::Show { date, routine } => show(ctx, date, routine).await,
        ProgressAction::Set { routine, date, done, undone, value } => {
            set(ctx, routine, date, build_update(done, undone, value)).await
        }
    }
}

async fn show(ctx: &Context, date: Option<String>, routine: Option<String>) -> Result<()> {
    let date = normalize_day(date.as_deref())?;
    let user = ctx.current_user().await?;

    let mut filter = ProgressFilter::day(date);
    if let Some(prefix) = routine {
        filter = filter.routine(resolve_routine_id(&ctx.db, &user.id, &prefix).await?);
    }
    let records = find_progress(&ctx.db.pool, &user.id, &filter).await?;

    if ctx.format == OutputFormat::Json {
        return print_json(&records);
    }

    let names: HashMap<String, String> = RoutineStore::new(ctx.db.pool.clone())
        .list(&user.id)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let rows: Vec<ProgressRow> = records
        .iter()
        .map(|p| {
            let fallback = short_id(&p.routine_id);
            ProgressRow::new(p, names.get(&p.routine_id).unwrap_or(&fallback))
        })
        .collect();
    print_output(&rows, ctx.format)
}

async fn set(ctx: &Context, routine: String, date: Option<String>, update: ProgressUpdate) -> Result<()> {
    let date = normalize_day(date.as_deref())?;
    let user = ctx.current_user().await?;
    let routine_id = resolve_routine_id(&ctx.db, &user.id, &routine).await?;
    let routine = RoutineStore::new(ctx.db.pool.clone()).get(&user.id, &routine_id).await?;

    let record = upsert_progress(&ctx.db.pool, &user.id, &routine_id, date, update).await?;

    ctx.success(&format!("Recorded {} on {}", routine.name, record.date));
    match ctx.format {
        OutputFormat::Json => print_json(&record),
        OutputFormat::Table if !ctx.quiet => print_single(&ProgressRow::new(&record, &routine.name), ctx.format),
        OutputFormat::Table => Ok(()),
    }
}
