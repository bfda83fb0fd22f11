//! Request identity
//!
//! `AuthUser` resolves the `Authorization: Bearer` header to a stored user.
//! Handlers that take it never run for anonymous requests.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use habits_core::auth::{bearer_token, verify_token};
use habits_core::services::find_user;
use habits_core::{Database, Error, User};

use crate::error::ApiError;

pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl FromRequestParts<Database> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, db: &Database) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| Error::unauthenticated("missing bearer token"))?;

        let claims = verify_token(token)?;

        // Tokens outlive deleted accounts
        let Some(user) = find_user(&db.pool, &claims.sub).await? else {
            return Err(Error::unauthenticated(format!("unknown user {}", claims.sub)).into());
        };

        Ok(AuthUser(user))
    }
}
