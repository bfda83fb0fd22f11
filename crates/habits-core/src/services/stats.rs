//! Daily aggregation, per-routine series and derived summaries
//!
//! The pure builders take already-loaded routines and progress, so the same
//! numbers come out of the HTTP handlers, the CLI dashboard and the tests.
//! The async loaders at the bottom only fetch and delegate.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::completion::is_completed;
use super::dates::{days_from, window_start};
use super::progress::{find_progress, ProgressFilter};
use super::recurrence::{due_on, is_due};
use super::routines::RoutineStore;
use crate::error::{Error, Result};
use crate::models::{ProgressRecord, Routine, RoutineType};

/// Default stats window in days
pub const DEFAULT_DAYS: u32 = 7;
/// Largest stats window accepted
pub const MAX_DAYS: u32 = 366;
/// Window the profile summary (and its streak) is computed over
pub const PROFILE_DAYS: u32 = 30;

// ============================================================================
// Output types
// ============================================================================

/// Completed vs. due routines on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
}

/// A recorded value, boolean or numeric depending on the routine type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesValue {
    Bool(bool),
    Number(f64),
}

/// One day of a single routine's series; `value` is `None` when nothing was recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<SeriesValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub routine_type: String,
    pub icon: Option<String>,
    pub goal: Option<i64>,
}

impl From<&Routine> for RoutineSummary {
    fn from(r: &Routine) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            routine_type: r.routine_type.clone(),
            icon: r.icon.clone(),
            goal: r.goal,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedRoutine {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub routine_type: String,
    pub goal: Option<i64>,
}

impl From<&Routine> for SelectedRoutine {
    fn from(r: &Routine) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            routine_type: r.routine_type.clone(),
            goal: r.goal,
        }
    }
}

/// `GET /stats` payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub routines: Vec<RoutineSummary>,
    pub daily_data: Vec<DailyPoint>,
    pub routine_data: Vec<SeriesPoint>,
    pub selected_routine: Option<SelectedRoutine>,
    pub streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_routines: usize,
    pub completed_today: u32,
    pub streak: u32,
}

/// A routine due on the overview day, with what was recorded for it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueRoutine {
    #[serde(flatten)]
    pub routine: RoutineSummary,
    pub progress: Option<ProgressRecord>,
    pub completed: bool,
}

/// Routines due on one day plus that day's completion count
#[derive(Debug, Clone, Serialize)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub routines: Vec<DueRoutine>,
    pub completed: u32,
    pub total: u32,
}

// ============================================================================
// Progress lookup
// ============================================================================

/// Progress records keyed by routine id, then by day
pub struct ProgressIndex<'a> {
    by_routine: HashMap<&'a str, HashMap<NaiveDate, &'a ProgressRecord>>,
}

impl<'a> ProgressIndex<'a> {
    pub fn new(records: &'a [ProgressRecord]) -> Self {
        let mut by_routine: HashMap<&'a str, HashMap<NaiveDate, &'a ProgressRecord>> = HashMap::new();
        for record in records {
            by_routine
                .entry(record.routine_id.as_str())
                .or_default()
                .insert(record.date, record);
        }
        Self { by_routine }
    }

    pub fn get(&self, routine_id: &str, date: NaiveDate) -> Option<&'a ProgressRecord> {
        self.by_routine.get(routine_id)?.get(&date).copied()
    }
}

// ============================================================================
// Builders
// ============================================================================

/// `{completed, total}` for each of `num_days` days starting at `start`
pub fn build_daily_series(
    routines: &[Routine],
    progress: &[ProgressRecord],
    start: NaiveDate,
    num_days: u32,
) -> Vec<DailyPoint> {
    let index = ProgressIndex::new(progress);

    days_from(start, num_days)
        .map(|date| {
            let mut point = DailyPoint {
                date,
                completed: 0,
                total: 0,
            };
            for routine in due_on(routines, date) {
                point.total += 1;
                if is_completed(routine, index.get(&routine.id, date)) {
                    point.completed += 1;
                }
            }
            point
        })
        .collect()
}

/// Raw recorded values of one routine, regardless of whether it was due
pub fn build_series(
    routine: &Routine,
    progress: &[ProgressRecord],
    start: NaiveDate,
    num_days: u32,
) -> Vec<SeriesPoint> {
    let index = ProgressIndex::new(progress);
    let kind = routine.kind();

    days_from(start, num_days)
        .map(|date| {
            let record = index.get(&routine.id, date);
            match kind {
                Some(RoutineType::Boolean) => SeriesPoint {
                    date,
                    value: record.and_then(|p| p.boolean_value).map(SeriesValue::Bool),
                    goal: None,
                },
                Some(RoutineType::Numeric) => SeriesPoint {
                    date,
                    value: record.and_then(|p| p.numeric_value).map(SeriesValue::Number),
                    goal: Some(routine.effective_goal()),
                },
                None => SeriesPoint {
                    date,
                    value: None,
                    goal: None,
                },
            }
        })
        .collect()
}

/// Consecutive fully-completed days counting back from the last point.
///
/// Days with nothing due neither extend nor break the streak.
pub fn current_streak(daily: &[DailyPoint]) -> u32 {
    let mut streak = 0;
    for point in daily.iter().rev() {
        if point.total == 0 {
            continue;
        }
        if point.completed < point.total {
            break;
        }
        streak += 1;
    }
    streak
}

/// Assemble the stats payload for the window of `num_days` ending on `end`
pub fn build_stats(
    routines: &[Routine],
    progress: &[ProgressRecord],
    end: NaiveDate,
    num_days: u32,
    selected_id: Option<&str>,
) -> StatsResponse {
    let start = window_start(end, num_days);
    let daily_data = build_daily_series(routines, progress, start, num_days);

    let selected = selected_id.and_then(|id| routines.iter().find(|r| r.id == id));
    let routine_data = selected
        .map(|r| build_series(r, progress, start, num_days))
        .unwrap_or_default();

    StatsResponse {
        routines: routines.iter().map(RoutineSummary::from).collect(),
        streak: current_streak(&daily_data),
        daily_data,
        routine_data,
        selected_routine: selected.map(SelectedRoutine::from),
    }
}

/// Routines due on `date` with their progress, in routine order
pub fn build_day_overview(routines: &[Routine], progress: &[ProgressRecord], date: NaiveDate) -> DayOverview {
    let index = ProgressIndex::new(progress);

    let due: Vec<DueRoutine> = routines
        .iter()
        .filter(|r| is_due(r, date))
        .map(|r| {
            let record = index.get(&r.id, date);
            DueRoutine {
                routine: RoutineSummary::from(r),
                progress: record.cloned(),
                completed: is_completed(r, record),
            }
        })
        .collect();

    DayOverview {
        date,
        completed: due.iter().filter(|d| d.completed).count() as u32,
        total: due.len() as u32,
        routines: due,
    }
}

/// Stats window length; missing means the default, out of range is rejected
pub fn validate_days(days: Option<i64>) -> Result<u32> {
    match days {
        None => Ok(DEFAULT_DAYS),
        Some(d) if (1..=i64::from(MAX_DAYS)).contains(&d) => Ok(d as u32),
        Some(d) => Err(Error::validation(format!(
            "days must be between 1 and {}, got {}",
            MAX_DAYS, d
        ))),
    }
}

// ============================================================================
// Loaders
// ============================================================================

pub async fn load_stats(
    pool: &SqlitePool,
    user_id: &str,
    num_days: u32,
    selected_id: Option<&str>,
    today: NaiveDate,
) -> Result<StatsResponse> {
    let routines = RoutineStore::new(pool.clone()).list(user_id).await?;
    let start = window_start(today, num_days);
    let progress = find_progress(pool, user_id, &ProgressFilter::range(start, today)).await?;

    log::debug!(
        "[stats] {} routines, {} progress records over {} days for {}",
        routines.len(),
        progress.len(),
        num_days,
        user_id
    );

    Ok(build_stats(&routines, &progress, today, num_days, selected_id))
}

pub async fn profile_stats(pool: &SqlitePool, user_id: &str, today: NaiveDate) -> Result<ProfileStats> {
    let stats = load_stats(pool, user_id, PROFILE_DAYS, None, today).await?;

    Ok(ProfileStats {
        total_routines: stats.routines.len(),
        completed_today: stats.daily_data.last().map(|d| d.completed).unwrap_or(0),
        streak: stats.streak,
    })
}

pub async fn routines_for_date(pool: &SqlitePool, user_id: &str, date: NaiveDate) -> Result<DayOverview> {
    let routines = RoutineStore::new(pool.clone()).list(user_id).await?;
    let progress = find_progress(pool, user_id, &ProgressFilter::day(date)).await?;
    Ok(build_day_overview(&routines, &progress, date))
}
