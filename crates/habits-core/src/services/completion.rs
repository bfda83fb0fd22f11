//! Completion classification
//!
//! A BOOLEAN routine is completed when its record says `true`; a NUMERIC one
//! when the recorded value reaches the goal. A missing record is scored as
//! "false" / 0, never as "not applicable".

use crate::models::{ProgressRecord, Routine, RoutineType};

/// Whether `progress` satisfies `routine`'s success condition
pub fn is_completed(routine: &Routine, progress: Option<&ProgressRecord>) -> bool {
    match routine.kind() {
        Some(RoutineType::Boolean) => progress.and_then(|p| p.boolean_value).unwrap_or(false),
        Some(RoutineType::Numeric) => {
            let value = progress.and_then(|p| p.numeric_value).unwrap_or(0.0);
            value >= routine.effective_goal() as f64
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn routine(kind: &str, goal: Option<i64>) -> Routine {
        Routine {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            name: "Push-ups".to_string(),
            icon: None,
            routine_type: kind.to_string(),
            goal,
            frequency: "DAILY".to_string(),
            every_n_days: None,
            week_days: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn record(boolean_value: Option<bool>, numeric_value: Option<f64>) -> ProgressRecord {
        ProgressRecord {
            id: "p1".to_string(),
            routine_id: "r1".to_string(),
            user_id: "u1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            boolean_value,
            numeric_value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_boolean_completion() {
        let r = routine("BOOLEAN", None);
        assert!(is_completed(&r, Some(&record(Some(true), None))));
        assert!(!is_completed(&r, Some(&record(Some(false), None))));
        assert!(!is_completed(&r, Some(&record(None, None))));
        assert!(!is_completed(&r, None));
    }

    #[test]
    fn test_boolean_ignores_numeric_value() {
        let r = routine("BOOLEAN", None);
        assert!(!is_completed(&r, Some(&record(None, Some(10.0)))));
    }

    #[test]
    fn test_numeric_goal_boundary() {
        let r = routine("NUMERIC", Some(5));
        assert!(is_completed(&r, Some(&record(None, Some(5.0)))));
        assert!(is_completed(&r, Some(&record(None, Some(7.5)))));
        assert!(!is_completed(&r, Some(&record(None, Some(4.0)))));
        assert!(!is_completed(&r, Some(&record(None, Some(4.99)))));
        assert!(!is_completed(&r, None));
    }

    #[test]
    fn test_numeric_ignores_boolean_value() {
        let r = routine("NUMERIC", Some(2));
        assert!(!is_completed(&r, Some(&record(Some(true), None))));
    }

    #[test]
    fn test_numeric_default_goal_is_one() {
        let r = routine("NUMERIC", None);
        assert!(is_completed(&r, Some(&record(None, Some(1.0)))));
        assert!(!is_completed(&r, Some(&record(None, Some(0.0)))));
        assert!(!is_completed(&r, None));
    }

    #[test]
    fn test_unknown_type_never_completed() {
        let r = routine("CHECKLIST", None);
        assert!(!is_completed(&r, Some(&record(Some(true), Some(99.0)))));
    }
}
