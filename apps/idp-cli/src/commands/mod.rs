// mod.rs — Shared plumbing for CLI subcommands.

pub mod goal;
pub mod insights;
pub mod plan;
pub mod verify;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};

use idp_goal::{Actor, ReviewDecision, ReviewOutcome, Role};

use crate::config::TrackerConfig;
use crate::snapshot::Snapshot;

/// Resolved global options.
pub struct Env {
    pub data_dir: PathBuf,
    pub now: DateTime<Utc>,
    pub config: TrackerConfig,
}

impl Env {
    pub fn snapshot_path(&self) -> PathBuf {
        Snapshot::path(&self.data_dir)
    }

    pub fn load(&self) -> anyhow::Result<Snapshot> {
        Snapshot::load(&self.snapshot_path())
    }

    pub fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        snapshot.save(&self.snapshot_path())
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Member,
    Leader,
    Manager,
}

/// Who is issuing a mutating command.
#[derive(Args)]
pub struct ActorArgs {
    /// User id of the caller.
    #[arg(long = "as", value_name = "USER_ID")]
    pub actor: String,
    /// Role of the caller.
    #[arg(long, value_enum, default_value = "member")]
    pub role: RoleArg,
}

impl ActorArgs {
    pub fn actor(&self) -> Actor {
        let role = match self.role {
            RoleArg::Member => Role::Member,
            RoleArg::Leader => Role::Leader,
            RoleArg::Manager => Role::Manager,
        };
        Actor::new(self.actor.clone(), role)
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutcomeArg {
    Approved,
    Rejected,
    Pending,
}

/// A leader's review decision from the command line.
#[derive(Args)]
pub struct DecisionArgs {
    /// Review outcome.
    #[arg(long, value_enum)]
    pub outcome: OutcomeArg,
    /// Notes for the member.
    #[arg(long)]
    pub notes: Option<String>,
}

impl DecisionArgs {
    pub fn decision(&self) -> ReviewDecision {
        let outcome = match self.outcome {
            OutcomeArg::Approved => ReviewOutcome::Approved,
            OutcomeArg::Rejected => ReviewOutcome::Rejected,
            OutcomeArg::Pending => ReviewOutcome::Pending,
        };
        ReviewDecision {
            outcome,
            notes: self.notes.clone(),
        }
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
