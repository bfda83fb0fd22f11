//! API error mapping
//!
//! Every handler returns `Result<_, ApiError>`. Core errors become a status
//! code plus a `{"error": "..."}` body; store failures are logged and replaced
//! with a generic message.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use habits_core::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(Error::validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Unauthenticated(_) | Error::Jwt(_) => StatusCode::UNAUTHORIZED,
            Error::Validation(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self.0 {
            Error::Unauthenticated(reason) => {
                log::debug!("[auth] rejected request: {}", reason);
                "Unauthenticated".to_string()
            }
            Error::Jwt(e) => {
                log::debug!("[auth] rejected token: {}", e);
                "Unauthenticated".to_string()
            }
            Error::Validation(msg) => msg,
            Error::Json(e) => e.to_string(),
            Error::NotFound(what) => format!("{} not found", what),
            Error::Conflict(msg) => msg,
            other => {
                log::error!("[api] {}", other);
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError(Error::unauthenticated("x")).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError(Error::validation("x")).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(Error::not_found("x")).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(Error::conflict("x")).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError(Error::internal("x")).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError(Error::config("x")).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
