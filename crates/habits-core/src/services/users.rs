//! User records
//!
//! Only what the engine needs from an identity: an id to scope data by, an
//! email to find it again, and a cascade when the account goes away.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::User;

/// Lowercase and trim an email, rejecting anything not shaped like `local@domain.tld`
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split_once('.').is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(Error::validation(format!("Invalid email: {}", email)));
    }
    Ok(email)
}

/// The `users.email` unique key is the only arbiter of a taken email
fn email_conflict(e: sqlx::Error, email: &str) -> Error {
    let err = Error::from(e);
    if err.is_unique_violation() {
        Error::conflict(format!("Email already in use: {}", email))
    } else {
        err
    }
}

/// Create a user; the email must be unused
pub async fn create_user(pool: &SqlitePool, email: &str, name: Option<&str>) -> Result<User> {
    let email = normalize_email(email)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    let user: User = sqlx::query_as(
        "INSERT INTO users (id, email, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&id)
    .bind(&email)
    .bind(name)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| email_conflict(e, &email))?;

    log::info!("[users] Created user {}", id);
    Ok(user)
}

/// Change a user's display name and/or email.
///
/// `None` keeps the stored value; an empty name clears it. A new email must
/// be well formed and not belong to another user.
pub async fn update_user(pool: &SqlitePool, id: &str, name: Option<&str>, email: Option<&str>) -> Result<User> {
    let email = email.map(normalize_email).transpose()?;
    let clear_name = matches!(name.map(str::trim), Some(""));
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    let user: Option<User> = sqlx::query_as(
        r#"UPDATE users SET
           name = CASE WHEN ? THEN NULL ELSE COALESCE(?, name) END,
           email = COALESCE(?, email),
           updated_at = ?
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(clear_name)
    .bind(name)
    .bind(&email)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| email_conflict(e, email.as_deref().unwrap_or_default()))?;

    let user = user.ok_or_else(|| Error::not_found(format!("User {}", id)))?;
    log::info!("[users] Updated user {}", id);
    Ok(user)
}

pub async fn find_user(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY created_at, email")
        .fetch_all(pool)
        .await?;
    Ok(users)
}

/// Delete a user together with their routines and progress
pub async fn delete_user(pool: &SqlitePool, id: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM progress WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM routines WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(Error::not_found(format!("User {}", id)));
    }

    tx.commit().await?;
    log::info!("[users] Deleted user {}", id);
    Ok(())
}
