//! User commands
//!
//! Provision users and hand out the bearer tokens the HTTP server accepts.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use super::{short_id, Context};
use crate::output::{print_error, print_json, print_output, print_single, OutputFormat};
use habits_core::auth::create_token;
use habits_core::services::{create_user, delete_user, find_user_by_email, list_users, update_user};
use habits_core::User;

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user
    Create {
        /// Email address (unique)
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List users
    List,

    /// Change a user's name or email
    Update {
        /// Current email address
        email: String,

        /// New display name (empty string clears it)
        #[arg(short, long)]
        name: Option<String>,

        /// New email address
        #[arg(long = "new-email")]
        new_email: Option<String>,
    },

    /// Print a bearer token for a user
    Token {
        /// Email address
        email: String,
    },

    /// Delete a user with all routines and progress
    Delete {
        /// Email address
        email: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// User row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Created")]
    pub created: String,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            id: short_id(&user.id),
            email: user.email,
            name: user.name.unwrap_or_else(|| "-".to_string()),
            created: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

pub async fn execute(ctx: &Context, action: UserAction) -> Result<()> {
    match action {
        UserAction::Create { email, name } => create(ctx, email, name).await,
        UserAction::List => list(ctx).await,
        UserAction::Update { email, name, new_email } => update(ctx, email, name, new_email).await,
        UserAction::Token { email } => token(ctx, email).await,
        UserAction::Delete { email, force } => delete(ctx, email, force).await,
    }
}

async fn create(ctx: &Context, email: String, name: Option<String>) -> Result<()> {
    let user = create_user(&ctx.db.pool, &email, name.as_deref()).await?;

    ctx.success(&format!("Created user: {}", user.email));
    print_single(&UserRow::from(user), ctx.format)?;

    Ok(())
}

async fn list(ctx: &Context) -> Result<()> {
    let rows: Vec<UserRow> = list_users(&ctx.db.pool)
        .await?
        .into_iter()
        .map(UserRow::from)
        .collect();
    print_output(&rows, ctx.format)
}

async fn update(ctx: &Context, email: String, name: Option<String>, new_email: Option<String>) -> Result<()> {
    if name.is_none() && new_email.is_none() {
        anyhow::bail!("Nothing to update: pass --name or --new-email");
    }
    let user = find_user_by_email(&ctx.db.pool, &email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", email))?;

    let user = update_user(&ctx.db.pool, &user.id, name.as_deref(), new_email.as_deref()).await?;

    ctx.success(&format!("Updated user: {}", user.email));
    print_single(&UserRow::from(user), ctx.format)?;
    Ok(())
}

async fn token(ctx: &Context, email: String) -> Result<()> {
    let user = find_user_by_email(&ctx.db.pool, &email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", email))?;
    let token = create_token(&user)?;

    match ctx.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "token": token }))?,
        // Bare token so it can be captured by scripts
        OutputFormat::Table => println!("{}", token),
    }
    Ok(())
}

async fn delete(ctx: &Context, email: String, force: bool) -> Result<()> {
    let user = find_user_by_email(&ctx.db.pool, &email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found: {}", email))?;

    if !force {
        print_single(&UserRow::from(user), ctx.format)?;
        print_error("Use --force to confirm deletion");
        return Ok(());
    }

    delete_user(&ctx.db.pool, &user.id).await?;
    ctx.success(&format!("Deleted user: {}", email));

    Ok(())
}
