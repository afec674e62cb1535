use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchup_scout::analysis::ScoutingEngine;
use matchup_scout::config::AppConfig;
use matchup_scout::models::{AnalysisWindow, DataStatus, TeamId};
use matchup_scout::parse_window;
use matchup_scout::source::{fetch_scouting_input, JsonlSource, MatchSource};
use matchup_scout::storage::{self, StorageConfig};

#[derive(Parser)]
#[command(name = "matchup-scout")]
#[command(about = "Opponent scouting reports from VALORANT match data")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a scouting report against an opponent
    Report {
        /// Our team id
        team: String,

        /// Opponent team id
        opponent: String,

        /// Time window (e.g., "90d", "12w")
        #[arg(long, default_value = "90d")]
        window: String,

        /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        now: Option<String>,

        /// Maximum recommendations to keep
        #[arg(long)]
        top: Option<usize>,

        /// Append the report to reports.jsonl
        #[arg(long)]
        save: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List teams in the data directory
    Teams,

    /// Validate the configuration file and print the effective settings
    CheckConfig,
}

fn parse_now(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid --now (expected RFC 3339 or YYYY-MM-DD): {}", s))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("Invalid --now: no midnight on that date")?;
    Ok(midnight.and_utc())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&PathBuf::from(&cli.config))
        .with_context(|| format!("Loading {}", cli.config))?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting matchup-scout v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Report {
            team,
            opponent,
            window,
            now,
            top,
            save,
            pretty,
        } => {
            let Some(days) = parse_window(&window) else {
                bail!("Invalid --window (expected e.g. 90d or 12w): {}", window);
            };
            let now = match now {
                Some(s) => parse_now(&s)?,
                None => Utc::now(),
            };
            if let Some(top) = top {
                config.analysis.max_recommendations = top;
            }

            let engine = ScoutingEngine::from_app_config(&config)?;
            let source = JsonlSource::new(storage.clone());
            let input = fetch_scouting_input(
                &source,
                &TeamId::from(team),
                &TeamId::from(opponent),
                AnalysisWindow::new(now, days),
            )
            .await?;

            let report = engine.build_report(&input)?;
            match report.data_status() {
                DataStatus::Sufficient => {}
                DataStatus::Limited { reason } | DataStatus::Insufficient { reason } => {
                    tracing::warn!("{}", reason);
                }
            }

            let json = if pretty {
                report.to_json_pretty()?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);

            if save {
                storage::append_report(&storage, &report)?;
                tracing::info!(
                    "Saved report {} to {:?}",
                    report.report_id(),
                    storage.reports_path()
                );
            }
        }

        Commands::Teams => {
            let source = JsonlSource::new(storage.clone());
            let teams = source.teams().await?;
            if teams.is_empty() {
                println!("No teams in {:?}", storage.teams_path());
            }
            for team in teams {
                println!(
                    "{:<16} {:<28} {}",
                    team.id,
                    team.name,
                    team.region.as_deref().unwrap_or("-")
                );
            }
        }

        Commands::CheckConfig => {
            let engine = ScoutingEngine::from_app_config(&config)?;
            let catalog = engine.catalog();
            println!("Configuration OK");
            println!("  data_dir: {:?}", config.data_dir);
            println!(
                "  catalog: {} maps, {} agents (strict: {})",
                catalog.map_count(),
                catalog.agent_count(),
                config.catalog.strict
            );
            println!("{}", toml::to_string_pretty(engine.config())?);
        }
    }

    Ok(())
}
