//! Routines API routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use habits_core::services::{normalize_day, routines_for_date, RoutineStore};
use habits_core::{CreateRoutine, Database, UpdateRoutine};

use crate::{auth::AuthUser, error::ApiResult};

/// Routines routes
pub fn routes() -> Router<Database> {
    Router::new()
        .route("/", get(list_routines).post(create_routine))
        .route("/today", get(routines_today))
        .route("/{id}", patch(update_routine).delete(delete_routine))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// List the caller's routines with their tags, oldest first
async fn list_routines(State(db): State<Database>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let routines = RoutineStore::new(db.pool).list_with_tags(auth.id()).await?;
    Ok(Json(routines))
}

async fn create_routine(
    State(db): State<Database>,
    auth: AuthUser,
    payload: Result<Json<CreateRoutine>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let routine = RoutineStore::new(db.pool).create(auth.id(), req).await?;
    Ok((StatusCode::CREATED, Json(routine)))
}

async fn update_routine(
    State(db): State<Database>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRoutine>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let routine = RoutineStore::new(db.pool).update(auth.id(), &id, req).await?;
    Ok(Json(routine))
}

/// Delete a routine together with its progress history
async fn delete_routine(
    State(db): State<Database>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    RoutineStore::new(db.pool).delete(auth.id(), &id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Routines due on `?date=` (default today) with their completion state
async fn routines_today(
    State(db): State<Database>,
    auth: AuthUser,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let date = normalize_day(query.date.as_deref())?;
    let overview = routines_for_date(&db.pool, auth.id(), date).await?;
    Ok(Json(overview))
}
