//! Account API routes: the caller's own profile

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::{delete, patch},
    Json, Router,
};
use serde_json::json;

use habits_core::services::{delete_user, update_user};
use habits_core::{Database, UpdateProfile};

use crate::{auth::AuthUser, error::ApiResult};

/// Account routes, mounted under `/api`
pub fn routes() -> Router<Database> {
    Router::new()
        .route("/profile", patch(update_profile))
        .route("/account", delete(delete_account))
}

/// Change name and/or email; a taken email is a 409
async fn update_profile(
    State(db): State<Database>,
    auth: AuthUser,
    payload: Result<Json<UpdateProfile>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let user = update_user(&db.pool, auth.id(), req.name.as_deref(), req.email.as_deref()).await?;

    Ok(Json(json!({
        "ok": true,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
        },
    })))
}

/// Delete the caller's account with all routines and progress
async fn delete_account(State(db): State<Database>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    delete_user(&db.pool, auth.id()).await?;
    Ok(Json(json!({ "ok": true })))
}
