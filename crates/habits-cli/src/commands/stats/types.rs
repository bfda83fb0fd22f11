//! Stats types
//!
//! Types for stats commands and display.

use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use crate::output::bar;
use habits_core::services::{weekday_index, weekday_label, DailyPoint, SeriesPoint, SeriesValue};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Completed vs. due routines per day
    Daily {
        /// Number of days to show (default: 7)
        #[arg(short, long)]
        days: Option<i64>,

        /// Last day of the window (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Recorded values of one routine
    Routine {
        /// Routine ID (prefix is enough)
        id: String,

        /// Number of days to show (default: 7)
        #[arg(short, long)]
        days: Option<i64>,

        /// Last day of the window (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Routine count, today's completions and current streak
    Profile,
}

#[derive(Debug, Serialize, Tabled)]
pub struct StatsRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct DailyRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Day")]
    pub weekday: String,
    #[tabled(rename = "Done")]
    pub done: String,
    #[tabled(rename = "")]
    pub visual: String,
}

impl From<&DailyPoint> for DailyRow {
    fn from(p: &DailyPoint) -> Self {
        let (done, visual) = if p.total == 0 {
            ("-".to_string(), "·".to_string())
        } else {
            (
                format!("{}/{}", p.completed, p.total),
                bar(f64::from(p.completed) / f64::from(p.total), 10),
            )
        };
        Self {
            date: p.date.to_string(),
            weekday: weekday_label(weekday_index(p.date)).to_string(),
            done,
            visual,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct SeriesRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Day")]
    pub weekday: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "")]
    pub visual: String,
}

impl From<&SeriesPoint> for SeriesRow {
    fn from(p: &SeriesPoint) -> Self {
        let (value, visual) = match (p.value, p.goal) {
            (None, _) => ("-".to_string(), "·".to_string()),
            (Some(SeriesValue::Bool(true)), _) => ("yes".to_string(), "✓".to_string()),
            (Some(SeriesValue::Bool(false)), _) => ("no".to_string(), "✗".to_string()),
            (Some(SeriesValue::Number(v)), Some(goal)) => (
                format!("{} / {}", v, goal),
                bar(v / goal.max(1) as f64, 10),
            ),
            (Some(SeriesValue::Number(v)), None) => (v.to_string(), String::new()),
        };
        Self {
            date: p.date.to_string(),
            weekday: weekday_label(weekday_index(p.date)).to_string(),
            value,
            visual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    #[test]
    fn test_daily_row() {
        let row = DailyRow::from(&DailyPoint { date: day(), completed: 1, total: 2 });
        assert_eq!(row.date, "2024-01-08");
        assert_eq!(row.weekday, "Mon");
        assert_eq!(row.done, "1/2");
        assert_eq!(row.visual, "█████░░░░░");

        let idle = DailyRow::from(&DailyPoint { date: day(), completed: 0, total: 0 });
        assert_eq!(idle.done, "-");
    }

    #[test]
    fn test_series_row() {
        let numeric = SeriesRow::from(&SeriesPoint {
            date: day(),
            value: Some(SeriesValue::Number(4.0)),
            goal: Some(8),
        });
        assert_eq!(numeric.value, "4 / 8");
        assert_eq!(numeric.visual, "█████░░░░░");

        let missing = SeriesRow::from(&SeriesPoint { date: day(), value: None, goal: None });
        assert_eq!(missing.value, "-");
    }
}
