//! Statistics API routes

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use habits_core::services::{load_stats, profile_stats, today, validate_days};
use habits_core::Database;

use crate::{auth::AuthUser, error::ApiResult};

/// Stats routes, mounted under `/api`
pub fn routes() -> Router<Database> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/profile/stats", get(get_profile_stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub days: Option<i64>,
    pub routine_id: Option<String>,
}

/// Daily completion series for the last `days` days ending today, plus the
/// value series of the selected routine
async fn get_stats(
    State(db): State<Database>,
    auth: AuthUser,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let num_days = validate_days(query.days)?;
    let selected = query.routine_id.as_deref().filter(|id| !id.is_empty());

    let stats = load_stats(&db.pool, auth.id(), num_days, selected, today()).await?;
    Ok(Json(stats))
}

async fn get_profile_stats(State(db): State<Database>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let profile = profile_stats(&db.pool, auth.id(), today()).await?;
    Ok(Json(profile))
}
