//! Authentication module - JWT token management
//!
//! Tokens are the identity every core operation is scoped to: the `sub` claim
//! is the user id. Issuing credentials in the first place is left to the
//! administrator (see the CLI `user token` command).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::models::{Claims, User};

/// JWT secret key - reads from environment variable or generates a secure random key
/// In production, set HABITS_JWT_SECRET environment variable
fn get_jwt_secret() -> &'static [u8] {
    static JWT_SECRET: OnceLock<Vec<u8>> = OnceLock::new();

    JWT_SECRET.get_or_init(|| match std::env::var("HABITS_JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret.into_bytes(),
        Ok(secret) if !secret.is_empty() => {
            log::warn!("HABITS_JWT_SECRET is shorter than 32 characters. Consider using a longer secret.");
            secret.into_bytes()
        }
        _ => {
            // Tokens won't survive a restart
            log::warn!("HABITS_JWT_SECRET not set. Generating random secret. Tokens won't persist across restarts.");
            use rand::Rng;
            let mut rng = rand::thread_rng();
            (0..64).map(|_| rng.gen::<u8>()).collect()
        }
    })
}

pub const TOKEN_EXPIRY_DAYS: i64 = 7;

/// Create a JWT token for a user
pub fn create_token(user: &User) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(TOKEN_EXPIRY_DAYS))
        .ok_or_else(|| Error::internal("token expiry overflow"))?
        .timestamp();

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret()),
    )?;
    Ok(token)
}

/// Verify and decode a JWT token
pub fn verify_token(token: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Helper Functions
    // ========================================================================

    fn create_test_user() -> User {
        User {
            id: "user-123".to_string(),
            email: "test@example.com".to_string(),
            name: Some("Test User".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // ========================================================================
    // JWT Token Tests
    // ========================================================================

    #[test]
    fn test_create_token_success() {
        let user = create_test_user();
        let token = create_token(&user).unwrap();

        // header.payload.signature
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_verify_token_roundtrip() {
        let user = create_test_user();
        let token = create_token(&user).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_verify_token_rejects_garbage() {
        assert!(verify_token("invalid.token.here").is_err());
        assert!(verify_token("not-a-jwt").is_err());
        assert!(verify_token("").is_err());
    }

    #[test]
    fn test_token_expiration_in_future() {
        let user = create_test_user();
        let claims = verify_token(&create_token(&user).unwrap()).unwrap();

        let expected_exp = (Utc::now() + Duration::days(TOKEN_EXPIRY_DAYS)).timestamp();

        // Allow 10 seconds tolerance
        assert!((claims.exp - expected_exp).abs() < 10);
    }

    #[test]
    fn test_create_token_different_users() {
        let user1 = create_test_user();
        let mut user2 = create_test_user();
        user2.id = "user-456".to_string();
        user2.email = "other@example.com".to_string();

        let token1 = create_token(&user1).unwrap();
        let token2 = create_token(&user2).unwrap();
        assert_ne!(token1, token2);

        assert_eq!(verify_token(&token1).unwrap().sub, "user-123");
        assert_eq!(verify_token(&token2).unwrap().sub, "user-456");
    }

    // ========================================================================
    // Header Parsing Tests
    // ========================================================================

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer  abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
