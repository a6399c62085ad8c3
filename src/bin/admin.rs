//! CLI administration tool for mini-link.
//!
//! Inspects the database and converts between ids and short codes without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # View totals
//! cargo run --bin admin -- stats
//!
//! # Show the record behind a code
//! cargo run --bin admin -- lookup 2Bi
//!
//! # Convert between ids and codes
//! cargo run --bin admin -- encode 10000
//! cargo run --bin admin -- decode 2Bi
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for `db`, `stats` and `lookup`): PostgreSQL connection string

use mini_link::domain::repositories::UrlRepository;
use mini_link::infrastructure::persistence::PgUrlRepository;
use mini_link::utils::base62;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing mini-link.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Show link and click totals
    Stats,

    /// Show the stored record for a short code
    Lookup {
        /// Short code to look up
        code: String,
    },

    /// Print the short code for an id
    Encode {
        /// Row id
        id: u64,
    },

    /// Print the id behind a short code
    Decode {
        /// Short code
        code: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { id } => print_encoded(id),
        Commands::Decode { code } => print_decoded(&code)?,
        Commands::Stats => handle_stats(&connect().await?).await?,
        Commands::Lookup { code } => handle_lookup(connect().await?, &code).await?,
        Commands::Db { action } => handle_db_action(action, &connect().await?).await?,
    }

    Ok(())
}

async fn connect() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

fn print_encoded(id: u64) {
    println!(
        "  {} -> {}",
        id.to_string().bright_black(),
        base62::encode(id).bright_yellow().bold()
    );
}

fn print_decoded(code: &str) -> Result<()> {
    let id = base62::decode(code)
        .with_context(|| format!("'{}' is not a valid short code", code))?;

    println!(
        "  {} -> {}",
        code.bright_yellow().bold(),
        id.to_string().bright_black()
    );

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of stored URLs
/// - URLs that never received a code (interrupted registrations)
/// - Total number of clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let urls: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE short_url IS NULL")
        .fetch_one(pool)
        .await?;

    let clicks: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(click_count), 0)::BIGINT FROM urls")
        .fetch_one(pool)
        .await?;

    println!("  URLs:            {}", urls.to_string().bright_white().bold());
    println!("  Without code:    {}", orphans.to_string().bright_black());
    println!("  Clicks:          {}", clicks.to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Prints the record stored for `code`.
async fn handle_lookup(pool: PgPool, code: &str) -> Result<()> {
    let repo = PgUrlRepository::new(Arc::new(pool));

    let record = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let Some(record) = record else {
        println!("{}", format!("No URL for code '{}'", code).yellow());
        return Ok(());
    };

    println!("{}", "URL record".bright_blue().bold());
    println!();
    println!("  ID:       {}", record.id.to_string().bright_black());
    println!("  Code:     {}", code.bright_yellow().bold());
    println!("  Long URL: {}", record.long_url.cyan());
    println!("  Clicks:   {}", record.click_count.to_string().bright_white());
    println!(
        "  Created:  {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(pool)
                .await
                .context("Database check failed")?;

            println!("{}", "Database connection OK".green().bold());
        }
    }

    Ok(())
}
