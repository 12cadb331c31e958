//! CLI administration tool for LinkHub.
//!
//! Provides commands for managing accounts, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # List accounts
//! cargo run --bin admin -- users list
//!
//! # Delete an account with its profile and links
//! cargo run --bin admin -- users delete alice
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//!
//! # Features
//!
//! - **Account Management**: List and delete users
//! - **Statistics**: View user, link and click counts
//! - **Database Tools**: Connection checks and info queries
//! - **Interactive Prompts**: Confirmation before destructive actions
//! - **Colored Output**: Terminal-friendly formatting using `colored` crate

use linkhub::domain::entities::normalize_identifier;
use linkhub::domain::repositories::UserRepository;
use linkhub::infrastructure::persistence::PgUserRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing LinkHub.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Account management subcommands.
#[derive(Subcommand)]
enum UsersAction {
    /// List all accounts
    List,

    /// Delete an account together with its profile and links
    Delete {
        /// Username of the account
        username: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[derive(sqlx::FromRow)]
struct UserSummaryRow {
    username: String,
    email: String,
    is_active: bool,
    is_public: Option<bool>,
    link_count: i64,
    created_at: DateTime<Utc>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Users { action } => handle_users_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches account management commands.
async fn handle_users_action(action: UsersAction, pool: &PgPool) -> Result<()> {
    match action {
        UsersAction::List => list_users(pool).await?,
        UsersAction::Delete { username, yes } => {
            let repo = Arc::new(PgUserRepository::new(Arc::new(pool.clone())));
            delete_user(repo, &username, yes).await?;
        }
    }

    Ok(())
}

/// Lists accounts with their link counts and profile visibility.
///
/// # Output Format
///
/// ```text
/// 👥 Users
///
///   Username         Email                          Links  Created           Status
///   ───────────────────────────────────────────────────────────────────────────────
///   alice            alice@example.com              3      2024-01-15 10:30  ACTIVE
/// ```
async fn list_users(pool: &PgPool) -> Result<()> {
    println!("{}", "👥 Users".bright_blue().bold());
    println!();

    let users: Vec<UserSummaryRow> = sqlx::query_as(
        r#"
        SELECT u.username, u.email, u.is_active, p.is_public,
               (SELECT COUNT(*) FROM links l WHERE l.user_id = u.id) AS link_count,
               u.created_at
        FROM users u
        LEFT JOIN profiles p ON p.user_id = u.id
        ORDER BY u.created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<16} {:<30} {:<6} {:<17} {}",
        "Username".bright_white().bold(),
        "Email".bright_white().bold(),
        "Links".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(85).bright_black());

    for user in &users {
        let status = match (user.is_active, user.is_public) {
            (false, _) => "INACTIVE".red(),
            (true, Some(false)) => "PRIVATE".yellow(),
            (true, _) => "ACTIVE".green(),
        };

        println!(
            "  {:<16} {:<30} {:<6} {:<17} {}",
            user.username.cyan(),
            user.email,
            user.link_count.to_string().bright_white(),
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes an account after confirmation.
///
/// The profile and all links go with it.
async fn delete_user(
    repo: Arc<PgUserRepository>,
    username: &str,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🗑️  Delete User".bright_blue().bold());
    println!();

    let user = repo
        .find_by_username(&normalize_identifier(username))
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    println!("  Username: {}", user.username.cyan());
    println!("  Email:    {}", user.email);
    println!("  ID:       {}", user.id.to_string().bright_black());
    println!();
    println!(
        "{}",
        "⚠️  The profile and all links of this user will be deleted."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this user?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .delete(user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete user: {}", e))?;

    if deleted {
        println!("{}", "✅ User deleted".green().bold());
    } else {
        println!("{}", "⚠️  User was already gone".yellow());
    }
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Number of users and public profiles
/// - Number of links, active links and recorded clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let public_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE is_public")
            .fetch_one(pool)
            .await?;

    let (links_count, active_count, clicks_count): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COUNT(*) FILTER (WHERE is_active),
               COALESCE(SUM(click_count), 0)::bigint
        FROM links
        "#,
    )
    .fetch_one(pool)
    .await?;

    println!(
        "  Users:           {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Public profiles: {}",
        public_count.to_string().bright_green().bold()
    );
    println!(
        "  Links:           {} ({} active)",
        links_count.to_string().bright_green().bold(),
        active_count.to_string().green()
    );
    println!(
        "  Clicks:          {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let size: String =
                sqlx::query_scalar("SELECT pg_size_pretty(pg_database_size(current_database()))")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Size:       {}", size.bright_white());
            println!();
        }
    }

    Ok(())
}
