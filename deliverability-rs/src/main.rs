//! Operator CLI for the deliverability guard
//!
//! Runs one decision against the configured policy and prints the verdict as
//! JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Score a campaign email before queuing it
//! deliverability-guard score --subject "October roadmap" --html-file email.html
//!
//! # Today's limit for an account created on 2026-10-01 with a 2000/day setting
//! deliverability-guard limit --created-at 2026-10-01T00:00:00Z --configured 2000
//!
//! # Gate a send run on its running statistics
//! deliverability-guard health --stats-file stats.json
//!
//! # Use a tuned policy
//! deliverability-guard --config guard.toml pace --created-at 2026-10-01T00:00:00Z
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use deliverability_rs::config::LoggingConfig;
use deliverability_rs::engagement::ContactEngagement;
use deliverability_rs::health::CampaignStat;
use deliverability_rs::{DeliverabilityGuard, GuardConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deliverability-guard")]
#[command(about = "Check outbound email against sending reputation policy", long_about = None)]
struct Cli {
    /// Policy file (TOML); GUARD__* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an email's subject and HTML body for spam signals
    Score {
        #[arg(short, long, default_value = "")]
        subject: String,
        /// File holding the HTML body
        #[arg(long)]
        html_file: PathBuf,
    },
    /// Warm-up ceiling and effective daily limit for an account
    Limit {
        /// Account creation time (RFC 3339)
        #[arg(long, value_parser = parse_timestamp)]
        created_at: DateTime<Utc>,
        /// Operator-configured daily limit
        #[arg(long)]
        configured: Option<u32>,
    },
    /// Bounce/complaint gate over a JSON array of campaign statistics
    Health {
        #[arg(long)]
        stats_file: PathBuf,
    },
    /// Engagement segment for one contact (JSON object)
    Engagement {
        #[arg(long)]
        contact_file: PathBuf,
    },
    /// Batch size and per-email delay for an account
    Pace {
        /// Account creation time (RFC 3339)
        #[arg(long, value_parser = parse_timestamp)]
        created_at: DateTime<Utc>,
    },
    /// Segment and action tallies over a JSON array of contacts
    Hygiene {
        #[arg(long)]
        contacts_file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GuardConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging);
    if let Some(path) = &cli.config {
        info!("Loaded configuration from {}", path.display());
    }

    let guard = DeliverabilityGuard::new(config)?;
    let now = Utc::now();

    match cli.command {
        Commands::Score { subject, html_file } => {
            let html = std::fs::read_to_string(&html_file)
                .with_context(|| format!("Failed to read {}", html_file.display()))?;
            let analysis = guard.analyze_content(&subject, &html);
            info!(score = analysis.score, level = analysis.level.as_str(), "Content scored");
            print_json(&analysis)?;
        }
        Commands::Limit {
            created_at,
            configured,
        } => match configured {
            Some(configured) => {
                print_json(&guard.effective_daily_limit(configured, created_at, now))?
            }
            None => print_json(&guard.warmup_daily_limit(created_at, now))?,
        },
        Commands::Health { stats_file } => {
            let stats: Vec<CampaignStat> = read_json(&stats_file)?;
            print_json(&guard.campaign_health(&stats))?;
        }
        Commands::Engagement { contact_file } => {
            let contact: ContactEngagement = read_json(&contact_file)?;
            print_json(&guard.contact_engagement(&contact, now))?;
        }
        Commands::Pace { created_at } => {
            print_json(&guard.sending_pace(created_at, now))?;
        }
        Commands::Hygiene { contacts_file } => {
            let contacts: Vec<ContactEngagement> = read_json(&contacts_file)?;
            print_json(&guard.hygiene_report(&contacts, now))?;
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
