//! Progress records
//!
//! One record per (routine, user, day). Writes are partial: only the fields a
//! caller supplies are touched, everything else keeps its stored value.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::dates::normalize_day;
use crate::error::{Error, Result};
use crate::models::{ProgressRecord, ProgressUpdate, RecordProgress};

/// Reject writes that carry nothing, or a numeric value no goal can be compared with
pub fn validate_update(update: &ProgressUpdate) -> Result<()> {
    if update.boolean_value.is_none() && update.numeric_value.is_none() {
        return Err(Error::validation("Either booleanValue or numericValue is required"));
    }
    if let Some(value) = update.numeric_value {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::validation(format!(
                "numericValue must be a non-negative number, got {}",
                value
            )));
        }
    }
    Ok(())
}

async fn upsert_once(
    pool: &SqlitePool,
    user_id: &str,
    routine_id: &str,
    date: NaiveDate,
    update: ProgressUpdate,
) -> Result<Option<ProgressRecord>> {
    let now = Utc::now();

    // Selecting from routines makes the ownership check and the write one statement
    let record: Option<ProgressRecord> = sqlx::query_as(
        r#"
        INSERT INTO progress (id, routine_id, user_id, date, boolean_value, numeric_value, created_at, updated_at)
        SELECT ?, r.id, r.user_id, ?, ?, ?, ?, ?
        FROM routines r
        WHERE r.id = ? AND r.user_id = ?
        ON CONFLICT(routine_id, user_id, date) DO UPDATE SET
            boolean_value = COALESCE(excluded.boolean_value, progress.boolean_value),
            numeric_value = COALESCE(excluded.numeric_value, progress.numeric_value),
            updated_at = excluded.updated_at
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(date)
    .bind(update.boolean_value)
    .bind(update.numeric_value)
    .bind(now)
    .bind(now)
    .bind(routine_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Create or merge the progress record for (`routine_id`, `user_id`, `date`).
///
/// Ownership is checked by the same statement that writes, so a routine that
/// is missing or belongs to someone else yields `NotFound` and nothing is
/// stored. A unique-key violation from a racing writer is retried once; the
/// second attempt lands on the conflict branch and merges.
pub async fn upsert_progress(
    pool: &SqlitePool,
    user_id: &str,
    routine_id: &str,
    date: NaiveDate,
    update: ProgressUpdate,
) -> Result<ProgressRecord> {
    validate_update(&update)?;

    let mut attempt = 0;
    let written = loop {
        attempt += 1;
        match upsert_once(pool, user_id, routine_id, date, update).await {
            Err(e) if e.is_unique_violation() && attempt < 2 => {
                log::warn!("[progress] Concurrent write on routine {} {}, retrying", routine_id, date);
            }
            other => break other?,
        }
    };

    let record = written.ok_or_else(|| Error::not_found(format!("Routine {}", routine_id)))?;
    log::debug!("[progress] Upserted {} for routine {} on {}", record.id, routine_id, date);
    Ok(record)
}

/// `POST /progress` body: normalize the day (missing = today), then upsert
pub async fn record_progress(pool: &SqlitePool, user_id: &str, req: &RecordProgress) -> Result<ProgressRecord> {
    let date = normalize_day(req.date.as_deref())?;
    upsert_progress(pool, user_id, &req.routine_id, date, req.update()).await
}

/// Which of a user's progress records to load
#[derive(Debug, Clone, Default)]
pub struct ProgressFilter {
    /// First day, inclusive
    pub start: Option<NaiveDate>,
    /// Last day, inclusive
    pub end: Option<NaiveDate>,
    pub routine_id: Option<String>,
}

impl ProgressFilter {
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            routine_id: None,
        }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::range(date, date)
    }

    pub fn routine(mut self, routine_id: impl Into<String>) -> Self {
        self.routine_id = Some(routine_id.into());
        self
    }
}

/// Progress records owned by `user_id`, ordered by day then routine
pub async fn find_progress(pool: &SqlitePool, user_id: &str, filter: &ProgressFilter) -> Result<Vec<ProgressRecord>> {
    let mut sql = String::from("SELECT * FROM progress WHERE user_id = ?");
    if filter.start.is_some() {
        sql.push_str(" AND date >= ?");
    }
    if filter.end.is_some() {
        sql.push_str(" AND date <= ?");
    }
    if filter.routine_id.is_some() {
        sql.push_str(" AND routine_id = ?");
    }
    sql.push_str(" ORDER BY date ASC, routine_id ASC");

    let mut query = sqlx::query_as::<_, ProgressRecord>(&sql).bind(user_id);
    if let Some(start) = filter.start {
        query = query.bind(start);
    }
    if let Some(end) = filter.end {
        query = query.bind(end);
    }
    if let Some(routine_id) = &filter.routine_id {
        query = query.bind(routine_id);
    }

    Ok(query.fetch_all(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{CreateRoutine, RoutineType};
    use crate::services::routines::RoutineStore;
    use crate::services::users::create_user;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    async fn setup() -> (Database, String, String) {
        let db = Database::open_in_memory().await.unwrap();
        let user = create_user(&db.pool, "p@example.com", None).await.unwrap();
        let routine = RoutineStore::new(db.pool.clone())
            .create(
                &user.id,
                CreateRoutine {
                    name: "Water".to_string(),
                    routine_type: Some(RoutineType::Numeric),
                    goal: Some(8),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (db, user.id, routine.id)
    }

    fn numeric(v: f64) -> ProgressUpdate {
        ProgressUpdate {
            numeric_value: Some(v),
            ..Default::default()
        }
    }

    fn boolean(b: bool) -> ProgressUpdate {
        ProgressUpdate {
            boolean_value: Some(b),
            ..Default::default()
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_validate_update() {
        assert!(validate_update(&numeric(0.0)).is_ok());
        assert!(validate_update(&boolean(false)).is_ok());
        assert!(matches!(validate_update(&ProgressUpdate::default()), Err(Error::Validation(_))));
        assert!(matches!(validate_update(&numeric(-1.0)), Err(Error::Validation(_))));
        assert!(matches!(validate_update(&numeric(f64::NAN)), Err(Error::Validation(_))));
        assert!(matches!(validate_update(&numeric(f64::INFINITY)), Err(Error::Validation(_))));
    }

    // ========================================================================
    // Upsert
    // ========================================================================

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let (db, user_id, routine_id) = setup().await;

        let first = upsert_progress(&db.pool, &user_id, &routine_id, day(5), boolean(true)).await.unwrap();
        assert_eq!(first.boolean_value, Some(true));
        assert_eq!(first.numeric_value, None);
        assert_eq!(first.date, day(5));

        let merged = upsert_progress(&db.pool, &user_id, &routine_id, day(5), numeric(3.0)).await.unwrap();
        assert_eq!(merged.id, first.id);
        assert_eq!(merged.boolean_value, Some(true));
        assert_eq!(merged.numeric_value, Some(3.0));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (db, user_id, routine_id) = setup().await;
        upsert_progress(&db.pool, &user_id, &routine_id, day(2), boolean(false)).await.unwrap();
        upsert_progress(&db.pool, &user_id, &routine_id, day(2), numeric(5.0)).await.unwrap();
        let again = upsert_progress(&db.pool, &user_id, &routine_id, day(2), numeric(5.0)).await.unwrap();

        let all = find_progress(&db.pool, &user_id, &ProgressFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(again.numeric_value, Some(5.0));
        assert_eq!(again.boolean_value, Some(false));
    }

    #[tokio::test]
    async fn test_upsert_rejects_foreign_routine() {
        let (db, _user_id, routine_id) = setup().await;
        let intruder = create_user(&db.pool, "x@example.com", None).await.unwrap();

        let err = upsert_progress(&db.pool, &intruder.id, &routine_id, day(1), boolean(true))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = upsert_progress(&db.pool, &intruder.id, "missing", day(1), boolean(true))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_write_touches_nothing() {
        let (db, user_id, routine_id) = setup().await;
        let err = upsert_progress(&db.pool, &user_id, &routine_id, day(1), ProgressUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(find_progress(&db.pool, &user_id, &ProgressFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_progress_parses_date() {
        let (db, user_id, routine_id) = setup().await;
        let req = RecordProgress {
            routine_id: routine_id.clone(),
            date: Some("2024-01-09".to_string()),
            boolean_value: None,
            numeric_value: Some(8.0),
        };
        let record = record_progress(&db.pool, &user_id, &req).await.unwrap();
        assert_eq!(record.date, day(9));

        let bad = RecordProgress {
            date: Some("09/01/2024".to_string()),
            ..req
        };
        assert!(matches!(record_progress(&db.pool, &user_id, &bad).await, Err(Error::Validation(_))));
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[tokio::test]
    async fn test_find_progress_filters() {
        let (db, user_id, routine_id) = setup().await;
        for d in 1..=5 {
            upsert_progress(&db.pool, &user_id, &routine_id, day(d), numeric(d as f64)).await.unwrap();
        }

        let window = find_progress(&db.pool, &user_id, &ProgressFilter::range(day(2), day(4))).await.unwrap();
        let days: Vec<NaiveDate> = window.iter().map(|p| p.date).collect();
        assert_eq!(days, vec![day(2), day(3), day(4)]);

        let one = find_progress(&db.pool, &user_id, &ProgressFilter::day(day(5)).routine(routine_id.clone()))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].numeric_value, Some(5.0));

        let none = find_progress(&db.pool, &user_id, &ProgressFilter::default().routine("other"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_routine_delete_cascades_progress() {
        let (db, user_id, routine_id) = setup().await;
        upsert_progress(&db.pool, &user_id, &routine_id, day(1), numeric(1.0)).await.unwrap();
        RoutineStore::new(db.pool.clone()).delete(&user_id, &routine_id).await.unwrap();
        assert!(find_progress(&db.pool, &user_id, &ProgressFilter::default()).await.unwrap().is_empty());
    }
}
