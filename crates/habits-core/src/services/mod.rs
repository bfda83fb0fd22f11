//! Services module

pub mod completion;
pub mod dates;
pub mod progress;
pub mod recurrence;
pub mod routines;
pub mod stats;
pub mod users;

pub use completion::is_completed;
pub use dates::{
    day_offset, days_from, format_day, normalize_day, parse_day, today, weekday_index,
    weekday_label, window_start, DayInput,
};
pub use progress::{
    find_progress, record_progress, upsert_progress, validate_update, ProgressFilter,
};
pub use recurrence::{due_on, is_due, Recurrence, WeekDays};
pub use routines::{find_or_create_tags, normalize_tag_names, RoutineStore};
pub use stats::{
    build_daily_series, build_day_overview, build_series, build_stats, current_streak,
    load_stats, profile_stats, routines_for_date, validate_days, DailyPoint, DayOverview,
    DueRoutine, ProfileStats, ProgressIndex, RoutineSummary, SelectedRoutine, SeriesPoint,
    SeriesValue, StatsResponse, DEFAULT_DAYS, MAX_DAYS, PROFILE_DAYS,
};
pub use users::{
    create_user, delete_user, find_user, find_user_by_email, list_users, normalize_email, update_user,
};
