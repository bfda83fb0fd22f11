//! Data models for the Habits application

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile edit request; omitted fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// JWT Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub exp: i64,
}

/// How progress on a routine is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutineType {
    Boolean, // done / not done
    Numeric, // value measured against a goal
}

impl RoutineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineType::Boolean => "BOOLEAN",
            RoutineType::Numeric => "NUMERIC",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BOOLEAN" => Some(RoutineType::Boolean),
            "NUMERIC" => Some(RoutineType::Numeric),
            _ => None,
        }
    }
}

/// Cadence of a routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    EveryNDays,
    SpecificDays,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::EveryNDays => "EVERY_N_DAYS",
            Frequency::SpecificDays => "SPECIFIC_DAYS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DAILY" => Some(Frequency::Daily),
            "EVERY_N_DAYS" => Some(Frequency::EveryNDays),
            "SPECIFIC_DAYS" => Some(Frequency::SpecificDays),
            _ => None,
        }
    }
}

/// Routine model, as stored.
///
/// Enumerations are kept as their stored strings so that a row written by an
/// older or foreign writer still loads; evaluation decides what to make of it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Routine {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub routine_type: String,      // "BOOLEAN" | "NUMERIC"
    pub goal: Option<i64>,
    pub frequency: String,         // "DAILY" | "EVERY_N_DAYS" | "SPECIFIC_DAYS"
    pub every_n_days: Option<i64>,
    pub week_days: Option<String>, // JSON array, 0 = Sunday .. 6 = Saturday
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Routine {
    pub fn kind(&self) -> Option<RoutineType> {
        RoutineType::parse(&self.routine_type)
    }

    pub fn schedule(&self) -> Option<Frequency> {
        Frequency::parse(&self.frequency)
    }

    /// Goal used for completion, defaulting to 1 when unset
    pub fn effective_goal(&self) -> i64 {
        self.goal.unwrap_or(1)
    }

    /// Stored weekday indices, or `None` if the column is missing or malformed
    pub fn week_day_indices(&self) -> Option<Vec<i64>> {
        let raw = self.week_days.as_deref()?;
        serde_json::from_str(raw).ok()
    }

    /// Local calendar day the routine was created on
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.with_timezone(&Local).date_naive()
    }
}

/// Routine as returned to clients, with its tag names resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub routine_type: String,
    pub goal: Option<i64>,
    pub frequency: String,
    pub every_n_days: Option<i64>,
    pub week_days: Vec<i64>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoutineResponse {
    pub fn new(routine: Routine, tags: Vec<String>) -> Self {
        let week_days = routine.week_day_indices().unwrap_or_default();
        Self {
            id: routine.id,
            user_id: routine.user_id,
            name: routine.name,
            icon: routine.icon,
            routine_type: routine.routine_type,
            goal: routine.goal,
            frequency: routine.frequency,
            every_n_days: routine.every_n_days,
            week_days,
            tags,
            created_at: routine.created_at,
            updated_at: routine.updated_at,
        }
    }
}

/// Tag model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One routine's recorded state on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: String,
    pub routine_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub boolean_value: Option<bool>,
    pub numeric_value: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create routine request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoutine {
    pub name: String,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub routine_type: Option<RoutineType>,
    pub goal: Option<i64>,
    pub frequency: Option<Frequency>,
    pub every_n_days: Option<i64>,
    pub week_days: Option<Vec<i64>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update routine request; omitted fields keep their stored value.
///
/// An empty `icon` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoutine {
    pub name: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub routine_type: Option<RoutineType>,
    pub goal: Option<i64>,
    pub frequency: Option<Frequency>,
    pub every_n_days: Option<i64>,
    pub week_days: Option<Vec<i64>>,
    pub tags: Option<Vec<String>>,
}

/// Partial progress write; only supplied fields are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub boolean_value: Option<bool>,
    pub numeric_value: Option<f64>,
}

/// Record progress request (`POST /progress`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordProgress {
    pub routine_id: String,
    pub date: Option<String>,
    pub boolean_value: Option<bool>,
    pub numeric_value: Option<f64>,
}

impl RecordProgress {
    pub fn update(&self) -> ProgressUpdate {
        ProgressUpdate {
            boolean_value: self.boolean_value,
            numeric_value: self.numeric_value,
        }
    }
}
