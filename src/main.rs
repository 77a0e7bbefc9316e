//! Rescate operator CLI
//!
//! Evaluates subscriber snapshots against the entitlement engine and prints
//! the result as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rescate_core::{config::LogFormat, models::EntitlementQuery, AppConfig};
use rescate_entitlements::EntitlementEngine;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Rescate - service entitlement engine
#[derive(Parser)]
#[command(name = "rescate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default + config/{RUN_MODE})
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print limits, alerts and statistics for a snapshot
    Evaluate {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },

    /// Print only the validation report; exits non-zero when invalid
    Validate {
        /// Snapshot JSON file
        snapshot: PathBuf,
    },
}

/// Initialize tracing/logging
fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.logging.level;
        EnvFilter::new(format!(
            "rescate={},rescate_entitlements={},rescate_core={}",
            level, level, level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => {
            let path = path.to_str().context("configuration path is not valid UTF-8")?;
            AppConfig::from_file(path)
        }
        None => AppConfig::load(),
    };
    config.context("failed to load configuration")
}

fn read_snapshot(path: &Path) -> Result<EntitlementQuery> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let query = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    Ok(query)
}

/// Outcome of a command over one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Accepted,
    Rejected,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Accepted => ExitCode::SUCCESS,
            Outcome::Rejected => ExitCode::FAILURE,
        }
    }
}

/// Run one command and write its JSON report to `out`
fn execute(command: Command, engine: &EntitlementEngine, out: &mut impl Write) -> Result<Outcome> {
    match command {
        Command::Evaluate { snapshot } => {
            let query = read_snapshot(&snapshot)?;
            let summary = engine.aggregate(&query);
            info!(
                subscriber = %query.user.display_name(),
                valid = summary.is_valid,
                alerts = summary.alerts.len(),
                "Snapshot evaluated"
            );
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            Ok(Outcome::Accepted)
        }
        Command::Validate { snapshot } => {
            let query = read_snapshot(&snapshot)?;
            let report = engine.validate(&query);
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            if report.is_valid {
                Ok(Outcome::Accepted)
            } else {
                warn!(
                    subscriber = %query.user.display_name(),
                    first_error = report.first_error().unwrap_or_default(),
                    "Snapshot rejected"
                );
                Ok(Outcome::Rejected)
            }
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);
    debug!(?config, "Configuration loaded");

    let engine = EntitlementEngine::new(config.entitlements);
    let outcome = execute(cli.command, &engine, &mut std::io::stdout().lock())?;
    Ok(outcome.into())
}

fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    run(Cli::parse())
}
