//! API module - Axum routes

pub mod account;
pub mod health;
pub mod progress;
pub mod routines;
pub mod stats;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use habits_core::Database;

/// Create the API router with all routes
pub fn create_router(db: Database) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::routes())
        .nest("/api/routines", routines::routes())
        .nest("/api/progress", progress::routes())
        .nest("/api", stats::routes().merge(account::routes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}
