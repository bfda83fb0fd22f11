//! Routine helper functions
//!
//! Argument parsing and display helpers shared by routine commands.

use anyhow::Result;

use super::types::{FrequencyArg, KindArg};
use habits_core::models::{CreateRoutine, Frequency, UpdateRoutine};
use habits_core::services::weekday_label;

/// Parse a weekday list such as `mon,wed`, `1,3` or `Sun Sat` (0 = Sunday)
pub fn parse_week_days(s: &str) -> Result<Vec<i64>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            if let Ok(index) = part.parse::<i64>() {
                return Ok(index);
            }
            (0..7u32)
                .find(|&i| part.get(..3).is_some_and(|p| p.eq_ignore_ascii_case(weekday_label(i))))
                .map(i64::from)
                .ok_or_else(|| anyhow::anyhow!("Invalid weekday: {}. Use 0-6 (0 = Sunday) or sun..sat", part))
        })
        .collect()
}

/// Human-readable cadence
pub fn describe_schedule(frequency: &str, every_n_days: Option<i64>, week_days: &[i64]) -> String {
    match Frequency::parse(frequency) {
        Some(Frequency::Daily) => "daily".to_string(),
        Some(Frequency::EveryNDays) => match every_n_days {
            Some(1) => "every day".to_string(),
            Some(n) => format!("every {} days", n),
            None => "every ? days".to_string(),
        },
        Some(Frequency::SpecificDays) => week_days
            .iter()
            .map(|&d| u32::try_from(d).map(weekday_label).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", "),
        None => frequency.to_string(),
    }
}

/// A frequency implied by `--every` / `--days` when none is given
fn implied_frequency(
    frequency: Option<FrequencyArg>,
    every: Option<i64>,
    days: &Option<Vec<i64>>,
) -> Option<Frequency> {
    match (frequency, every, days) {
        (Some(f), _, _) => Some(f.into()),
        (None, Some(_), _) => Some(Frequency::EveryNDays),
        (None, None, Some(_)) => Some(Frequency::SpecificDays),
        (None, None, None) => None,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn build_create(
    name: String,
    icon: Option<String>,
    kind: Option<KindArg>,
    goal: Option<i64>,
    frequency: Option<FrequencyArg>,
    every: Option<i64>,
    days: Option<String>,
    tags: Vec<String>,
) -> Result<CreateRoutine> {
    let week_days = days.as_deref().map(parse_week_days).transpose()?;
    Ok(CreateRoutine {
        name,
        icon,
        routine_type: kind.map(Into::into),
        goal,
        frequency: implied_frequency(frequency, every, &week_days),
        every_n_days: every,
        week_days,
        tags,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn build_update(
    name: Option<String>,
    icon: Option<String>,
    kind: Option<KindArg>,
    goal: Option<i64>,
    frequency: Option<FrequencyArg>,
    every: Option<i64>,
    days: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
) -> Result<UpdateRoutine> {
    let week_days = days.as_deref().map(parse_week_days).transpose()?;
    let tags = if clear_tags {
        Some(Vec::new())
    } else if tags.is_empty() {
        None
    } else {
        Some(tags)
    };
    Ok(UpdateRoutine {
        name,
        icon,
        routine_type: kind.map(Into::into),
        goal,
        frequency: implied_frequency(frequency, every, &week_days),
        every_n_days: every,
        week_days,
        tags,
    })
}

/// Resolve a routine ID prefix among the user's routines
pub async fn resolve_routine_id(db: &habits_core::Database, user_id: &str, id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        anyhow::bail!("Routine ID must not be empty");
    }

    // Literal prefix comparison: `%` and `_` in the input match only themselves
    let matches: Vec<(String,)> = sqlx::query_as(
        "SELECT id FROM routines WHERE user_id = ? AND substr(id, 1, length(?)) = ? LIMIT 2",
    )
    .bind(user_id)
    .bind(id)
    .bind(id)
    .fetch_all(&db.pool)
    .await?;

    match matches.as_slice() {
        [(full_id,)] => Ok(full_id.clone()),
        [] => Err(anyhow::anyhow!("Routine not found: {}", id)),
        _ => Err(anyhow::anyhow!("Routine ID prefix is ambiguous: {}", id)),
    }
}
