//! End-to-end checks of recurrence, upsert and aggregation against SQLite

use chrono::{Local, NaiveDate, TimeZone, Utc};
use habits_core::db::Database;
use habits_core::models::{CreateRoutine, Frequency, ProgressUpdate, RoutineType};
use habits_core::services::{
    create_user, delete_user, find_progress, load_stats, profile_stats, routines_for_date,
    upsert_progress, ProgressFilter, RoutineStore,
};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db = Database::open(db_path).await.expect("Failed to create test database");
    (db, temp_dir)
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Move a routine's creation timestamp to 09:00 local time on `day`
async fn backdate(db: &Database, routine_id: &str, day: NaiveDate) {
    let created_at = Local
        .from_local_datetime(&day.and_hms_opt(9, 0, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc);
    sqlx::query("UPDATE routines SET created_at = ? WHERE id = ?")
        .bind(created_at)
        .bind(routine_id)
        .execute(&db.pool)
        .await
        .expect("Failed to backdate routine");
}

fn boolean(b: bool) -> ProgressUpdate {
    ProgressUpdate {
        boolean_value: Some(b),
        numeric_value: None,
    }
}

fn numeric(v: f64) -> ProgressUpdate {
    ProgressUpdate {
        boolean_value: None,
        numeric_value: Some(v),
    }
}

#[tokio::test]
async fn test_upsert_idempotent_and_preserves_other_field() {
    let (db, _temp_dir) = create_test_db().await;
    let user = create_user(&db.pool, "idem@example.com", None).await.unwrap();
    let routine = RoutineStore::new(db.pool.clone())
        .create(&user.id, CreateRoutine { name: "Pages".to_string(), ..Default::default() })
        .await
        .unwrap();
    let day = ymd(2024, 3, 1);

    upsert_progress(&db.pool, &user.id, &routine.id, day, boolean(true)).await.unwrap();
    upsert_progress(&db.pool, &user.id, &routine.id, day, numeric(5.0)).await.unwrap();
    upsert_progress(&db.pool, &user.id, &routine.id, day, numeric(5.0)).await.unwrap();

    let records = find_progress(&db.pool, &user.id, &ProgressFilter::day(day)).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].numeric_value, Some(5.0));
    assert_eq!(records[0].boolean_value, Some(true));
}

#[tokio::test]
async fn test_late_numeric_write_does_not_revert_boolean() {
    let (db, _temp_dir) = create_test_db().await;
    let user = create_user(&db.pool, "order@example.com", None).await.unwrap();
    let routine = RoutineStore::new(db.pool.clone())
        .create(&user.id, CreateRoutine { name: "Run".to_string(), ..Default::default() })
        .await
        .unwrap();
    let day = ymd(2024, 3, 2);

    upsert_progress(&db.pool, &user.id, &routine.id, day, numeric(1.0)).await.unwrap();
    upsert_progress(&db.pool, &user.id, &routine.id, day, boolean(true)).await.unwrap();
    // Debounced numeric update arriving late
    let record = upsert_progress(&db.pool, &user.id, &routine.id, day, numeric(2.0)).await.unwrap();

    assert_eq!(record.boolean_value, Some(true));
    assert_eq!(record.numeric_value, Some(2.0));
}

#[tokio::test]
async fn test_concurrent_upserts_single_record() {
    let (db, _temp_dir) = create_test_db().await;
    let user = create_user(&db.pool, "race@example.com", None).await.unwrap();
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
    let day = ymd(2024, 3, 3);

    let mut handles = Vec::new();
    for i in 0..10 {
        let pool = db.pool.clone();
        let user_id = user.id.clone();
        let routine_id = routine.id.clone();
        handles.push(tokio::spawn(async move {
            let update = if i % 2 == 0 { numeric(i as f64) } else { boolean(true) };
            upsert_progress(&pool, &user_id, &routine_id, day, update).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("upsert should not fail under contention");
    }

    let records = find_progress(&db.pool, &user.id, &ProgressFilter::default()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].boolean_value, Some(true));
    assert!(records[0].numeric_value.is_some());
}

#[tokio::test]
async fn test_stats_every_two_days_scenario() {
    let (db, _temp_dir) = create_test_db().await;
    let user = create_user(&db.pool, "stats@example.com", None).await.unwrap();
    let routine = RoutineStore::new(db.pool.clone())
        .create(
            &user.id,
            CreateRoutine {
                name: "Laundry".to_string(),
                frequency: Some(Frequency::EveryNDays),
                every_n_days: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    backdate(&db, &routine.id, ymd(2024, 1, 1)).await;
    upsert_progress(&db.pool, &user.id, &routine.id, ymd(2024, 1, 3), boolean(true)).await.unwrap();

    let stats = load_stats(&db.pool, &user.id, 5, Some(&routine.id), ymd(2024, 1, 5)).await.unwrap();

    let totals: Vec<u32> = stats.daily_data.iter().map(|p| p.total).collect();
    assert_eq!(totals, vec![1, 0, 1, 0, 1]);
    let completed: Vec<u32> = stats.daily_data.iter().map(|p| p.completed).collect();
    assert_eq!(completed, vec![0, 0, 1, 0, 0]);
    assert_eq!(stats.daily_data[0].date, ymd(2024, 1, 1));

    assert_eq!(stats.routine_data.len(), 5);
    assert_eq!(stats.selected_routine.as_ref().map(|s| s.id.as_str()), Some(routine.id.as_str()));
    // The last due day is still open
    assert_eq!(stats.streak, 0);
}

#[tokio::test]
async fn test_stats_two_of_three_completed() {
    let (db, _temp_dir) = create_test_db().await;
    let user = create_user(&db.pool, "three@example.com", None).await.unwrap();
    let store = RoutineStore::new(db.pool.clone());
    let day = ymd(2024, 2, 14);

    let mut ids = Vec::new();
    for name in ["Floss", "Stretch"] {
        let r = store
            .create(&user.id, CreateRoutine { name: name.to_string(), ..Default::default() })
            .await
            .unwrap();
        upsert_progress(&db.pool, &user.id, &r.id, day, boolean(true)).await.unwrap();
        ids.push(r.id);
    }
    let pushups = store
        .create(
            &user.id,
            CreateRoutine {
                name: "Push-ups".to_string(),
                routine_type: Some(RoutineType::Numeric),
                goal: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    upsert_progress(&db.pool, &user.id, &pushups.id, day, numeric(2.0)).await.unwrap();

    let stats = load_stats(&db.pool, &user.id, 1, None, day).await.unwrap();
    assert_eq!(stats.daily_data.len(), 1);
    assert_eq!((stats.daily_data[0].completed, stats.daily_data[0].total), (2, 3));
    assert_eq!(stats.routines.len(), 3);

    let overview = routines_for_date(&db.pool, &user.id, day).await.unwrap();
    assert_eq!((overview.completed, overview.total), (2, 3));
}

#[tokio::test]
async fn test_specific_days_only_counted_on_their_weekdays() {
    let (db, _temp_dir) = create_test_db().await;
    let user = create_user(&db.pool, "weekly@example.com", None).await.unwrap();
    RoutineStore::new(db.pool.clone())
        .create(
            &user.id,
            CreateRoutine {
                name: "Gym".to_string(),
                frequency: Some(Frequency::SpecificDays),
                week_days: Some(vec![1, 3]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // 2024-01-06 (Sat) .. 2024-01-19 (Fri)
    let stats = load_stats(&db.pool, &user.id, 14, None, ymd(2024, 1, 19)).await.unwrap();
    let due: Vec<NaiveDate> = stats
        .daily_data
        .iter()
        .filter(|p| p.total == 1)
        .map(|p| p.date)
        .collect();
    assert_eq!(due, vec![ymd(2024, 1, 8), ymd(2024, 1, 10), ymd(2024, 1, 15), ymd(2024, 1, 17)]);
}

#[tokio::test]
async fn test_profile_stats_streak() {
    let (db, _temp_dir) = create_test_db().await;
    let user = create_user(&db.pool, "streak@example.com", None).await.unwrap();
    let routine = RoutineStore::new(db.pool.clone())
        .create(&user.id, CreateRoutine { name: "Meditate".to_string(), ..Default::default() })
        .await
        .unwrap();
    let today = ymd(2024, 5, 20);
    backdate(&db, &routine.id, ymd(2024, 5, 1)).await;

    for d in [17, 18, 19, 20] {
        upsert_progress(&db.pool, &user.id, &routine.id, ymd(2024, 5, d), boolean(true)).await.unwrap();
    }

    let profile = profile_stats(&db.pool, &user.id, today).await.unwrap();
    assert_eq!(profile.total_routines, 1);
    assert_eq!(profile.completed_today, 1);
    assert_eq!(profile.streak, 4);
}

#[tokio::test]
async fn test_users_are_isolated_and_delete_cascades() {
    let (db, _temp_dir) = create_test_db().await;
    let alice = create_user(&db.pool, "alice@example.com", None).await.unwrap();
    let bob = create_user(&db.pool, "bob@example.com", None).await.unwrap();
    let store = RoutineStore::new(db.pool.clone());

    let routine = store
        .create(&alice.id, CreateRoutine { name: "Journal".to_string(), ..Default::default() })
        .await
        .unwrap();
    upsert_progress(&db.pool, &alice.id, &routine.id, ymd(2024, 1, 1), boolean(true)).await.unwrap();

    let bob_stats = load_stats(&db.pool, &bob.id, 7, Some(&routine.id), ymd(2024, 1, 1)).await.unwrap();
    assert!(bob_stats.routines.is_empty());
    assert!(bob_stats.selected_routine.is_none());
    assert!(bob_stats.routine_data.is_empty());

    delete_user(&db.pool, &alice.id).await.unwrap();
    let (routines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM routines").fetch_one(&db.pool).await.unwrap();
    let (progress,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM progress").fetch_one(&db.pool).await.unwrap();
    assert_eq!((routines, progress), (0, 0));
}
