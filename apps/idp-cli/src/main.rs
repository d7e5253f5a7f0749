//! # idp-cli
//!
//! Command-line interface over a goal-tracking snapshot file.
//!
//! - `idp goal list/health/request-review/cancel-review/review/delete`
//! - `idp plan health/request-review/cancel-review/propose-deadline/review`
//! - `idp verify score/checklist` — rubric preview and evidence checklist
//! - `idp insights` — dashboard rollups as JSON
//!
//! Every command reads `<data-dir>/snapshot.json`; mutating commands write
//! it back atomically. Thresholds come from `<data-dir>/.idp/tracker.toml`.

mod commands;
mod config;
mod snapshot;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Env;
use crate::config::TrackerConfig;

/// Goal review, health and insights over a snapshot file.
#[derive(Parser)]
#[command(name = "idp", version, about)]
struct Cli {
    /// Directory holding snapshot.json (defaults to current directory).
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Evaluate as of this RFC 3339 instant instead of the system clock.
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and review goals.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Inspect and review action plans.
    Plan {
        #[command(subcommand)]
        command: commands::plan::PlanCommands,
    },
    /// Rubric scoring and evidence checks for verification requests.
    Verify {
        #[command(subcommand)]
        command: commands::verify::VerifyCommands,
    },
    /// Compute dashboard insights for a year, team or member.
    Insights(commands::insights::InsightsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("idp_cli=info".parse()?)
                .add_directive("idp_goal=info".parse()?)
                .add_directive("idp_verify=info".parse()?)
                .add_directive("idp_insights=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let now = match cli.now.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc),
        None => Utc::now(),
    };
    let config = TrackerConfig::load_or_default(&TrackerConfig::path(&cli.data_dir));
    let env = Env {
        data_dir: cli.data_dir,
        now,
        config,
    };

    match &cli.command {
        Commands::Goal { command } => commands::goal::execute(command, &env),
        Commands::Plan { command } => commands::plan::execute(command, &env),
        Commands::Verify { command } => commands::verify::execute(command, &env),
        Commands::Insights(args) => commands::insights::execute(args, &env),
    }
}
