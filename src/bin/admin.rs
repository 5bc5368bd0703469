//! CLI administration tool for ttl-shortener.
//!
//! Runs reclaim passes, shows entry counts and checks the database without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Delete expired entries once (for cron / Kubernetes CronJob)
//! cargo run --bin admin -- reclaim --yes
//!
//! # Show live and expired entry counts
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Reads the same database settings as the server (`DATABASE_URL` or the
//! `DB_*` components, pool limits, `STORE_TIMEOUT_MS`, `RECLAIM_BATCH_SIZE`).

use ttl_shortener::application::services::ReclaimService;
use ttl_shortener::config::{self, Config};
use ttl_shortener::domain::clock::{Clock, SystemClock};
use ttl_shortener::domain::repositories::EntryRepository;
use ttl_shortener::infrastructure::persistence::PgEntryRepository;
use ttl_shortener::server::connect_database;
use ttl_shortener::utils::expiration::format_instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for operating ttl-shortener.
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
    /// Delete every entry whose expiration has passed
    Reclaim {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,

        /// Rows deleted per statement (defaults to RECLAIM_BATCH_SIZE)
        #[arg(short, long)]
        batch_size: Option<i64>,
    },

    /// Show live and expired entry counts
    Stats,

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

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    let pool = connect_database(&config, &database_url).await?;
    let repo = Arc::new(PgEntryRepository::new(
        Arc::new(pool.clone()),
        config.store_timeout(),
    ));

    match cli.command {
        Commands::Reclaim { yes, batch_size } => {
            handle_reclaim(repo, &config, yes, batch_size).await?
        }
        Commands::Stats => handle_stats(repo).await?,
        Commands::Db { action } => handle_db_action(action, repo, &pool).await?,
    }

    Ok(())
}

/// Runs one reclaim pass.
///
/// Shows how many rows are expired first and asks for confirmation unless
/// `--yes` is given. Exits with an error if the pass fails.
async fn handle_reclaim(
    repo: Arc<PgEntryRepository>,
    config: &Config,
    yes: bool,
    batch_size: Option<i64>,
) -> Result<()> {
    println!("{}", "🧹 Reclaim expired entries".bright_blue().bold());
    println!();

    let now = SystemClock.now();
    let counts = repo
        .count(now)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!("  As of:   {}", format_instant(now)?.bright_white());
    println!("  Expired: {}", counts.expired.to_string().yellow().bold());
    println!();

    if counts.expired == 0 {
        println!("{}", "✅ Nothing to reclaim".green());
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete these entries?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let batch_size = batch_size.unwrap_or(config.reclaim_batch_size);
    let service = ReclaimService::new(repo, batch_size);
    let removed = service
        .reclaim(now)
        .await
        .map_err(|e| anyhow::anyhow!("Reclaim failed: {}", e))?;

    println!(
        "{} {}",
        "✅ Removed".green().bold(),
        removed.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Displays entry counts split by visibility.
async fn handle_stats(repo: Arc<PgEntryRepository>) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let counts = repo
        .count(SystemClock.now())
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!(
        "  Live entries:    {}",
        counts.live.to_string().bright_green().bold()
    );
    println!(
        "  Expired entries: {}",
        counts.expired.to_string().yellow().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(
    action: DbAction,
    repo: Arc<PgEntryRepository>,
    pool: &PgPool,
) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            repo.ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
