// goal.rs — Goal subcommands: list, health, review workflow, delete.

use clap::Subcommand;
use uuid::Uuid;

use idp_goal::{
    apply_goal_transition, check_goal_deletable, evaluate_goal_health_with, expected_progress,
    GoalCommand,
};

use super::{truncate, ActorArgs, DecisionArgs, Env};

#[derive(Subcommand)]
pub enum GoalCommands {
    /// List goals with review state and health.
    List {
        /// Only goals owned by this user.
        #[arg(long)]
        user: Option<String>,
        /// Only goals for this year.
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show health for one goal.
    Health {
        /// Goal ID.
        id: Uuid,
    },
    /// Submit a goal for leader review (locks it).
    RequestReview {
        /// Goal ID.
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Withdraw a pending review request (unlocks it).
    CancelReview {
        /// Goal ID.
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Record a leader decision on a pending goal.
    Review {
        /// Goal ID.
        id: Uuid,
        #[command(flatten)]
        decision: DecisionArgs,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Delete an unlocked goal that has not started.
    Delete {
        /// Goal ID.
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
}

pub fn execute(cmd: &GoalCommands, env: &Env) -> anyhow::Result<()> {
    match cmd {
        GoalCommands::List { user, year } => list_goals(env, user.as_deref(), *year),
        GoalCommands::Health { id } => show_health(env, *id),
        GoalCommands::RequestReview { id, actor } => {
            transition(env, *id, &GoalCommand::RequestReview, actor)
        }
        GoalCommands::CancelReview { id, actor } => {
            transition(env, *id, &GoalCommand::CancelReview, actor)
        }
        GoalCommands::Review {
            id,
            decision,
            actor,
        } => transition(env, *id, &GoalCommand::LeaderReview(decision.decision()), actor),
        GoalCommands::Delete { id, actor } => delete_goal(env, *id, actor),
    }
}

fn list_goals(env: &Env, user: Option<&str>, year: Option<i32>) -> anyhow::Result<()> {
    let snapshot = env.load()?;
    let goals: Vec<_> = snapshot
        .goals
        .iter()
        .filter(|g| user.map_or(true, |u| g.user_id == u))
        .filter(|g| year.map_or(true, |y| g.year == y))
        .collect();

    if goals.is_empty() {
        println!("No goals found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<28} {:<12} {:<18} {:>4} {:<10}",
        "ID", "NAME", "STATUS", "REVIEW", "PCT", "HEALTH"
    );
    println!("{}", "-".repeat(116));

    for g in &goals {
        println!(
            "{:<38} {:<28} {:<12} {:<18} {:>4} {:<10}",
            g.id,
            truncate(&g.name, 26),
            g.status.to_string(),
            g.review.state_label(),
            g.progress,
            evaluate_goal_health_with(g, env.now, &env.config.health).to_string(),
        );
    }
    println!("\n{} goal(s) total.", goals.len());

    Ok(())
}

fn show_health(env: &Env, id: Uuid) -> anyhow::Result<()> {
    let snapshot = env.load()?;
    let goal = snapshot.goal(id)?;
    let expected = expected_progress(goal.start_date, goal.time_bound, env.now);

    println!("Goal:     {}", goal.id);
    println!("Name:     {}", goal.name);
    println!("Window:   {} .. {}", goal.start_date, goal.time_bound);
    println!("Progress: {}% (expected {}%)", goal.progress, expected);
    println!(
        "Health:   {}",
        evaluate_goal_health_with(goal, env.now, &env.config.health)
    );
    if goal.is_overdue(env.now.date_naive()) {
        println!("Overdue:  yes");
    }
    Ok(())
}

fn transition(env: &Env, id: Uuid, command: &GoalCommand, actor: &ActorArgs) -> anyhow::Result<()> {
    let mut snapshot = env.load()?;
    let current = snapshot.goal(id)?;
    let next = apply_goal_transition(current, command, &actor.actor(), env.now)?;
    let state = next.review.state_label();
    let status = next.status;
    *snapshot.goal_mut(id)? = next;
    env.save(&snapshot)?;

    println!("Goal {}: {} -> {} ({})", id, command.name(), state, status);
    Ok(())
}

fn delete_goal(env: &Env, id: Uuid, actor: &ActorArgs) -> anyhow::Result<()> {
    let mut snapshot = env.load()?;
    check_goal_deletable(snapshot.goal(id)?, &actor.actor())?;
    snapshot.goals.retain(|g| g.id != id);
    snapshot.verifications.retain(|v| v.goal_id != id);
    env.save(&snapshot)?;

    println!("Deleted goal {}", id);
    Ok(())
}
