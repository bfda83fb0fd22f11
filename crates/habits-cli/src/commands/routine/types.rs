//! Routine types
//!
//! Types for routine commands.

use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use super::helpers::describe_schedule;
use crate::commands::{short_id, truncate};
use habits_core::models::{Frequency, RoutineResponse, RoutineType};
use habits_core::services::DueRoutine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Done / not done
    Boolean,
    /// A value measured against a goal
    Numeric,
}

impl From<KindArg> for RoutineType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Boolean => RoutineType::Boolean,
            KindArg::Numeric => RoutineType::Numeric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    EveryNDays,
    SpecificDays,
}

impl From<FrequencyArg> for Frequency {
    fn from(frequency: FrequencyArg) -> Self {
        match frequency {
            FrequencyArg::Daily => Frequency::Daily,
            FrequencyArg::EveryNDays => Frequency::EveryNDays,
            FrequencyArg::SpecificDays => Frequency::SpecificDays,
        }
    }
}

#[derive(Subcommand)]
pub enum RoutineAction {
    /// List routines
    List,

    /// Show routines due on a day and whether they are done
    Today {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Add a new routine
    Add {
        /// Routine name
        name: String,

        /// Icon key or glyph
        #[arg(short, long)]
        icon: Option<String>,

        /// How progress is recorded
        #[arg(short = 't', long = "type", value_enum)]
        kind: Option<KindArg>,

        /// Daily goal for numeric routines
        #[arg(short, long)]
        goal: Option<i64>,

        /// Cadence
        #[arg(short, long, value_enum)]
        frequency: Option<FrequencyArg>,

        /// Interval in days (implies every-n-days)
        #[arg(short, long)]
        every: Option<i64>,

        /// Weekdays, e.g. "mon,wed" or "1,3" (0 = Sunday; implies specific-days)
        #[arg(short, long)]
        days: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Update an existing routine
    Update {
        /// Routine ID (prefix is enough)
        id: String,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New icon; empty clears it
        #[arg(short, long)]
        icon: Option<String>,

        /// Type (cannot differ from the current one)
        #[arg(short = 't', long = "type", value_enum)]
        kind: Option<KindArg>,

        /// New goal
        #[arg(short, long)]
        goal: Option<i64>,

        /// New cadence
        #[arg(short, long, value_enum)]
        frequency: Option<FrequencyArg>,

        /// New interval in days
        #[arg(short, long)]
        every: Option<i64>,

        /// New weekdays
        #[arg(short, long)]
        days: Option<String>,

        /// Replace tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Delete a routine and its progress
    Delete {
        /// Routine ID (prefix is enough)
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Routine row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct RoutineRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Goal")]
    pub goal: String,
    #[tabled(rename = "Schedule")]
    pub schedule: String,
    #[tabled(rename = "Tags")]
    pub tags: String,
}

impl From<&RoutineResponse> for RoutineRow {
    fn from(r: &RoutineResponse) -> Self {
        let name = match &r.icon {
            Some(icon) => format!("{} {}", icon, r.name),
            None => r.name.clone(),
        };
        Self {
            id: short_id(&r.id),
            name: truncate(&name, 32),
            kind: r.routine_type.clone(),
            goal: match (r.routine_type.as_str(), r.goal) {
                ("NUMERIC", Some(goal)) => goal.to_string(),
                _ => "-".to_string(),
            },
            schedule: describe_schedule(&r.frequency, r.every_n_days, &r.week_days),
            tags: if r.tags.is_empty() { "-".to_string() } else { r.tags.join(", ") },
        }
    }
}

/// Row of the per-day view
#[derive(Debug, Serialize, Tabled)]
pub struct DueRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[tabled(rename = "Done")]
    pub done: String,
}

impl From<&DueRoutine> for DueRow {
    fn from(d: &DueRoutine) -> Self {
        let record = d.progress.as_ref();
        let progress = match d.routine.routine_type.as_str() {
            "NUMERIC" => format!(
                "{} / {}",
                record.and_then(|p| p.numeric_value).unwrap_or(0.0),
                d.routine.goal.unwrap_or(1)
            ),
            _ => match record.and_then(|p| p.boolean_value) {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => "-".to_string(),
            },
        };
        Self {
            id: short_id(&d.routine.id),
            name: truncate(&d.routine.name, 32),
            progress,
            done: if d.completed { "✓" } else { "·" }.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn response(kind: &str, frequency: &str) -> RoutineResponse {
        RoutineResponse {
            id: "0123456789".to_string(),
            user_id: "u1".to_string(),
            name: "Drink water".to_string(),
            icon: Some("💧".to_string()),
            routine_type: kind.to_string(),
            goal: Some(8),
            frequency: frequency.to_string(),
            every_n_days: None,
            week_days: vec![1, 3],
            tags: vec!["health".to_string(), "morning".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_routine_row() {
        let row = RoutineRow::from(&response("NUMERIC", "SPECIFIC_DAYS"));
        assert_eq!(row.id, "01234567");
        assert_eq!(row.name, "💧 Drink water");
        assert_eq!(row.goal, "8");
        assert_eq!(row.schedule, "Mon, Wed");
        assert_eq!(row.tags, "health, morning");
    }

    #[test]
    fn test_boolean_row_hides_goal() {
        let row = RoutineRow::from(&response("BOOLEAN", "DAILY"));
        assert_eq!(row.goal, "-");
        assert_eq!(row.schedule, "daily");
    }

    #[test]
    fn test_kind_and_frequency_args_map() {
        assert_eq!(RoutineType::from(KindArg::Numeric), RoutineType::Numeric);
        assert_eq!(Frequency::from(FrequencyArg::EveryNDays), Frequency::EveryNDays);
    }
}
