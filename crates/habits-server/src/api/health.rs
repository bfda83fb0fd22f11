//! Liveness check, the only unauthenticated route

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use habits_core::Database;

pub fn routes() -> Router<Database> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": habits_core::version(),
    }))
}
