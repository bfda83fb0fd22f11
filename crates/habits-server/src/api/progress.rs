//! Progress API routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use habits_core::services::{find_progress, normalize_day, record_progress, ProgressFilter};
use habits_core::{Database, RecordProgress};

use crate::{auth::AuthUser, error::ApiResult};

/// Progress routes
pub fn routes() -> Router<Database> {
    Router::new().route("/", get(list_progress).post(upsert_progress))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub date: Option<String>,
    pub routine_id: Option<String>,
}

/// Progress recorded on one day (default today), optionally for one routine
async fn list_progress(
    State(db): State<Database>,
    auth: AuthUser,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let date = normalize_day(query.date.as_deref())?;

    let mut filter = ProgressFilter::day(date);
    if let Some(routine_id) = query.routine_id.filter(|id| !id.is_empty()) {
        filter = filter.routine(routine_id);
    }

    let records = find_progress(&db.pool, auth.id(), &filter).await?;
    Ok(Json(records))
}

/// Create or merge the record for `(routineId, date)`
async fn upsert_progress(
    State(db): State<Database>,
    auth: AuthUser,
    payload: Result<Json<RecordProgress>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let record = record_progress(&db.pool, auth.id(), &req).await?;
    Ok(Json(record))
}
