//! CLI commands module
//!
//! Contains all CLI command implementations.

pub mod progress;
pub mod routine;
pub mod stats;
pub mod user;

use anyhow::Result;

use crate::output::{print_success, OutputFormat};
use habits_core::services::{find_user_by_email, list_users};
use habits_core::{Database, User};

/// Shared context for all commands
pub struct Context {
    pub db: Database,
    pub format: OutputFormat,
    pub quiet: bool,
    /// Email given with `--user`
    pub user: Option<String>,
}

impl Context {
    /// Success message; silent in quiet mode and when stdout carries JSON
    pub fn success(&self, message: &str) {
        print_success(message, self.quiet || self.format == OutputFormat::Json);
    }

    /// The user commands act for: `--user` if given, otherwise the first user
    pub async fn current_user(&self) -> Result<User> {
        match &self.user {
            Some(email) => find_user_by_email(&self.db.pool, email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("User not found: {}", email)),
            None => list_users(&self.db.pool)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    anyhow::anyhow!("No user found. Create one with 'habits user create <email>'.")
                }),
        }
    }
}

/// Truncate string to max characters with ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = chars[..max_chars.saturating_sub(3)].iter().collect();
        format!("{}...", truncated)
    }
}

/// First 8 characters of an id, for tables
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
