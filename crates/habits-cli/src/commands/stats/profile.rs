//! Stats profile command

use anyhow::Result;

use super::types::StatsRow;
use crate::commands::Context;
use crate::output::{print_json, print_output, OutputFormat};
use habits_core::services::{profile_stats, today};

pub async fn show_profile(ctx: &Context) -> Result<()> {
    let user = ctx.current_user().await?;
    let profile = profile_stats(&ctx.db.pool, &user.id, today()).await?;

    if ctx.format == OutputFormat::Json {
        return print_json(&profile);
    }

    let rows = vec![
        StatsRow { metric: "User".to_string(), value: user.email },
        StatsRow { metric: "Routines".to_string(), value: profile.total_routines.to_string() },
        StatsRow { metric: "Completed today".to_string(), value: profile.completed_today.to_string() },
        StatsRow { metric: "Streak (days)".to_string(), value: profile.streak.to_string() },
    ];
    print_output(&rows, ctx.format)
}
