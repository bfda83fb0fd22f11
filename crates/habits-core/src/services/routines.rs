//! Routine storage
//!
//! Every operation is scoped to the requesting user: a routine that belongs to
//! someone else behaves exactly like one that does not exist.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use super::recurrence::WeekDays;
use crate::error::{Error, Result};
use crate::models::{
    CreateRoutine, Frequency, Routine, RoutineResponse, RoutineType, Tag, UpdateRoutine,
};

// ============================================================================
// Validation
// ============================================================================

/// Routine fields after validation, ready to be written
#[derive(Debug, Clone, PartialEq)]
struct RoutineDraft {
    name: String,
    icon: Option<String>,
    kind: RoutineType,
    goal: i64,
    frequency: Frequency,
    every_n_days: Option<i64>,
    week_days: WeekDays,
}

impl RoutineDraft {
    fn from_create(req: &CreateRoutine) -> Result<Self> {
        Self::build(
            &req.name,
            req.icon.as_deref(),
            req.routine_type.unwrap_or(RoutineType::Boolean),
            req.goal.unwrap_or(1),
            req.frequency.unwrap_or(Frequency::Daily),
            req.every_n_days,
            req.week_days.as_deref(),
        )
    }

    /// Apply an update on top of the stored routine
    fn merge(existing: &Routine, req: &UpdateRoutine) -> Result<Self> {
        let stored_kind = existing.kind();
        let kind = match (req.routine_type, stored_kind) {
            (Some(requested), Some(stored)) if requested != stored => {
                return Err(Error::validation(format!(
                    "Routine type cannot change from {} to {}",
                    stored.as_str(),
                    requested.as_str()
                )));
            }
            (Some(requested), _) => requested,
            (None, Some(stored)) => stored,
            (None, None) => {
                return Err(Error::validation(format!(
                    "Stored routine type {:?} is not recognized",
                    existing.routine_type
                )))
            }
        };

        let frequency = req.frequency.or_else(|| existing.schedule()).ok_or_else(|| {
            Error::validation(format!(
                "Stored frequency {:?} is not recognized; supply a frequency",
                existing.frequency
            ))
        })?;

        let week_days = match &req.week_days {
            Some(days) => Some(days.clone()),
            None => existing.week_day_indices(),
        };

        let icon = match &req.icon {
            Some(icon) => Some(icon.as_str()),
            None => existing.icon.as_deref(),
        };

        Self::build(
            req.name.as_deref().unwrap_or(&existing.name),
            icon,
            kind,
            req.goal.or(existing.goal).unwrap_or(1),
            frequency,
            req.every_n_days.or(existing.every_n_days),
            week_days.as_deref(),
        )
    }

    fn build(
        name: &str,
        icon: Option<&str>,
        kind: RoutineType,
        goal: i64,
        frequency: Frequency,
        every_n_days: Option<i64>,
        week_days: Option<&[i64]>,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Routine name must not be empty"));
        }
        if goal < 1 {
            return Err(Error::validation(format!("Goal must be a positive integer, got {}", goal)));
        }

        let every_n_days = match frequency {
            Frequency::EveryNDays => match every_n_days {
                Some(n) if n >= 1 => Some(n),
                Some(n) => {
                    return Err(Error::validation(format!(
                        "everyNDays must be a positive integer, got {}",
                        n
                    )))
                }
                None => return Err(Error::validation("everyNDays is required for EVERY_N_DAYS")),
            },
            _ => None,
        };

        let week_days = match frequency {
            Frequency::SpecificDays => {
                let indices = week_days.unwrap_or_default();
                let days = WeekDays::from_indices(indices).ok_or_else(|| {
                    Error::validation("weekDays values must be between 0 (Sunday) and 6 (Saturday)")
                })?;
                if days.is_empty() {
                    return Err(Error::validation("weekDays is required for SPECIFIC_DAYS"));
                }
                days
            }
            _ => WeekDays::default(),
        };

        Ok(Self {
            name: name.to_string(),
            icon: icon.map(str::trim).filter(|i| !i.is_empty()).map(str::to_string),
            kind,
            goal,
            frequency,
            every_n_days,
            week_days,
        })
    }

    fn week_days_json(&self) -> String {
        serde_json::Value::from(self.week_days.indices()).to_string()
    }
}

/// Trim, drop blanks, and collapse duplicate tag names (first spelling wins)
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !seen.iter().any(|s: &String| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

/// Resolve tags by name, creating the missing ones
pub async fn find_or_create_tags(conn: &mut SqliteConnection, names: &[String]) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    for name in normalize_tag_names(names) {
        sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(Uuid::new_v4().to_string())
            .bind(&name)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        let tag: Tag = sqlx::query_as("SELECT * FROM tags WHERE name = ?")
            .bind(&name)
            .fetch_one(&mut *conn)
            .await?;
        tags.push(tag);
    }
    Ok(tags)
}

async fn replace_routine_tags(conn: &mut SqliteConnection, routine_id: &str, names: &[String]) -> Result<()> {
    let tags = find_or_create_tags(&mut *conn, names).await?;

    sqlx::query("DELETE FROM routine_tags WHERE routine_id = ?")
        .bind(routine_id)
        .execute(&mut *conn)
        .await?;

    for tag in tags {
        sqlx::query("INSERT OR IGNORE INTO routine_tags (routine_id, tag_id) VALUES (?, ?)")
            .bind(routine_id)
            .bind(&tag.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

// ============================================================================
// RoutineStore
// ============================================================================

/// Storage layer for routines and their tags
#[derive(Clone)]
pub struct RoutineStore {
    pool: SqlitePool,
}

impl RoutineStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All routines owned by `user_id`, oldest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Routine>> {
        let routines: Vec<Routine> =
            sqlx::query_as("SELECT * FROM routines WHERE user_id = ? ORDER BY created_at ASC, id ASC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(routines)
    }

    /// All routines owned by `user_id` with tag names, oldest first
    pub async fn list_with_tags(&self, user_id: &str) -> Result<Vec<RoutineResponse>> {
        let routines = self.list(user_id).await?;

        let pairs: Vec<(String, String)> = sqlx::query_as(
            r#"SELECT rt.routine_id, t.name
               FROM routine_tags rt
               JOIN tags t ON t.id = rt.tag_id
               JOIN routines r ON r.id = rt.routine_id
               WHERE r.user_id = ?
               ORDER BY t.name"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut tags_by_routine: HashMap<String, Vec<String>> = HashMap::new();
        for (routine_id, name) in pairs {
            tags_by_routine.entry(routine_id).or_default().push(name);
        }

        Ok(routines
            .into_iter()
            .map(|r| {
                let tags = tags_by_routine.remove(&r.id).unwrap_or_default();
                RoutineResponse::new(r, tags)
            })
            .collect())
    }

    /// A routine owned by `user_id`; `NotFound` for missing and foreign ids alike
    pub async fn get(&self, user_id: &str, id: &str) -> Result<Routine> {
        let routine: Option<Routine> = sqlx::query_as("SELECT * FROM routines WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        routine.ok_or_else(|| Error::not_found(format!("Routine {}", id)))
    }

    pub async fn tags_for(&self, routine_id: &str) -> Result<Vec<String>> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"SELECT t.name FROM tags t
               JOIN routine_tags rt ON rt.tag_id = t.id
               WHERE rt.routine_id = ?
               ORDER BY t.name"#,
        )
        .bind(routine_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names.into_iter().map(|(n,)| n).collect())
    }

    async fn response(&self, user_id: &str, id: &str) -> Result<RoutineResponse> {
        let routine = self.get(user_id, id).await?;
        let tags = self.tags_for(id).await?;
        Ok(RoutineResponse::new(routine, tags))
    }

    pub async fn create(&self, user_id: &str, req: CreateRoutine) -> Result<RoutineResponse> {
        let draft = RoutineDraft::from_create(&req)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO routines (id, user_id, name, icon, routine_type, goal, frequency, every_n_days, week_days, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&draft.name)
        .bind(&draft.icon)
        .bind(draft.kind.as_str())
        .bind(draft.goal)
        .bind(draft.frequency.as_str())
        .bind(draft.every_n_days)
        .bind(draft.week_days_json())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        replace_routine_tags(&mut tx, &id, &req.tags).await?;

        tx.commit().await?;
        log::info!("[routines] Created routine {} for user {}", id, user_id);

        self.response(user_id, &id).await
    }

    pub async fn update(&self, user_id: &str, id: &str, req: UpdateRoutine) -> Result<RoutineResponse> {
        let existing = self.get(user_id, id).await?;
        let draft = RoutineDraft::merge(&existing, &req)?;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"UPDATE routines SET
               name = ?, icon = ?, goal = ?, frequency = ?, every_n_days = ?, week_days = ?, updated_at = ?
               WHERE id = ? AND user_id = ?"#,
        )
        .bind(&draft.name)
        .bind(&draft.icon)
        .bind(draft.goal)
        .bind(draft.frequency.as_str())
        .bind(draft.every_n_days)
        .bind(draft.week_days_json())
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Deleted between the read and the write
        if updated == 0 {
            return Err(Error::not_found(format!("Routine {}", id)));
        }

        if let Some(tags) = &req.tags {
            replace_routine_tags(&mut tx, id, tags).await?;
        }

        tx.commit().await?;
        log::info!("[routines] Updated routine {}", id);

        self.response(user_id, id).await
    }

    /// Delete a routine and all of its progress
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let progress_removed = sqlx::query("DELETE FROM progress WHERE routine_id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM routines WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(Error::not_found(format!("Routine {}", id)));
        }

        tx.commit().await?;
        log::info!(
            "[routines] Deleted routine {} ({} progress records)",
            id,
            progress_removed
        );
        Ok(())
    }
}
