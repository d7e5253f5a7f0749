// insights.rs — `idp insights`: dashboard rollups for a year, team or member.

use chrono::Datelike;
use clap::Args;

use idp_insights::{compute_insights_with, InsightContext, InsightWindow};

use super::{print_json, Env};

#[derive(Args)]
pub struct InsightsArgs {
    /// Goal year (defaults to the year of `--now`).
    #[arg(long)]
    year: Option<i32>,
    /// Only members of this team.
    #[arg(long)]
    team: Option<String>,
    /// Only this member.
    #[arg(long)]
    user: Option<String>,
    /// Trailing weeks in the window (defaults to the configured window).
    #[arg(long)]
    weeks: Option<u32>,
}

pub fn execute(args: &InsightsArgs, env: &Env) -> anyhow::Result<()> {
    let snapshot = env.load()?;

    let mut window = InsightWindow::new(env.now, args.year.unwrap_or_else(|| env.now.year()))
        .weeks(args.weeks.unwrap_or(env.config.insights.weeks));
    if let Some(team) = &args.team {
        window = window.team(team.clone());
    }
    if let Some(user) = &args.user {
        window = window.user(user.clone());
    }

    let ctx = InsightContext::default()
        .with_members(&snapshot.members)
        .with_history(&snapshot.progress_history)
        .with_verifications(&snapshot.verifications)
        .with_config(env.config.health.clone(), env.config.insights.clone());

    let mut bundle = compute_insights_with(&snapshot.goals, &snapshot.report_stats, &window, &ctx);
    bundle.skipped.extend(snapshot.skipped.iter().cloned());
    print_json(&bundle)
}
