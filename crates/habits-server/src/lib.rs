//! # habits-server
//!
//! JSON HTTP surface over `habits-core`. Every `/api` route is scoped to the
//! user named by the bearer token; `/health` is open.

pub mod api;
pub mod auth;
pub mod error;

pub use api::create_router;
pub use error::{ApiError, ApiResult};
