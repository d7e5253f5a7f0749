// plan.rs — Action plan subcommands: health, review requests, deadline proposals.

use chrono::NaiveDate;
use clap::Subcommand;
use uuid::Uuid;

use idp_goal::{apply_action_plan_transition, evaluate_action_plan_health_with, ActionPlanCommand};

use super::{ActorArgs, DecisionArgs, Env};

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show health for one action plan.
    Health {
        /// Action plan ID.
        id: Uuid,
    },
    /// Submit an action plan for leader review (locks it).
    RequestReview {
        /// Action plan ID.
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Withdraw a pending review or deadline request.
    CancelReview {
        /// Action plan ID.
        id: Uuid,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Ask the leader to move the plan's end date (locks the plan).
    ProposeDeadline {
        /// Action plan ID.
        id: Uuid,
        /// Requested end date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Record a leader decision on a pending plan or deadline request.
    Review {
        /// Action plan ID.
        id: Uuid,
        #[command(flatten)]
        decision: DecisionArgs,
        #[command(flatten)]
        actor: ActorArgs,
    },
}

pub fn execute(cmd: &PlanCommands, env: &Env) -> anyhow::Result<()> {
    match cmd {
        PlanCommands::Health { id } => show_health(env, *id),
        PlanCommands::RequestReview { id, actor } => {
            transition(env, *id, &ActionPlanCommand::RequestReview, actor)
        }
        PlanCommands::CancelReview { id, actor } => {
            transition(env, *id, &ActionPlanCommand::CancelReview, actor)
        }
        PlanCommands::ProposeDeadline { id, date, actor } => transition(
            env,
            *id,
            &ActionPlanCommand::ProposeDeadline { new_date: *date },
            actor,
        ),
        PlanCommands::Review {
            id,
            decision,
            actor,
        } => transition(
            env,
            *id,
            &ActionPlanCommand::LeaderReview(decision.decision()),
            actor,
        ),
    }
}

fn show_health(env: &Env, id: Uuid) -> anyhow::Result<()> {
    let snapshot = env.load()?;
    let plan = snapshot.plan(id)?;
    let tier = evaluate_action_plan_health_with(plan, &plan.weekly_reports, env.now, &env.config.health);

    println!("Action plan: {}", plan.id);
    println!("Activity:    {}", plan.activity);
    println!("Status:      {}", plan.status);
    println!("Window:      {} .. {}", plan.start_date, plan.end_date);
    match plan.last_report_date(&plan.weekly_reports) {
        Some(last) => println!("Last report: {}", last),
        None => println!("Last report: none"),
    }
    println!(
        "Deadlines:   {} change(s) left",
        plan.deadline_changes_left()
    );
    if let Some(requested) = plan.request_deadline_date {
        println!("Requested:   {} (awaiting review)", requested);
    }
    println!("Health:      {}", tier);
    Ok(())
}

fn transition(
    env: &Env,
    id: Uuid,
    command: &ActionPlanCommand,
    actor: &ActorArgs,
) -> anyhow::Result<()> {
    let mut snapshot = env.load()?;
    let next = apply_action_plan_transition(snapshot.plan(id)?, command, &actor.actor(), env.now)?;
    let state = next.review.state_label();
    let end_date = next.end_date;
    *snapshot.plan_mut(id)? = next;
    env.save(&snapshot)?;

    println!(
        "Action plan {}: {} -> {} (ends {})",
        id,
        command.name(),
        state,
        end_date
    );
    Ok(())
}
