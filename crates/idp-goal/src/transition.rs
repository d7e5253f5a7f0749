// transition.rs — Command entry points for goals and action plans.
//
// Each command is applied to a copy of the caller's record; on success the
// updated copy is returned, on failure the original is untouched. A command
// that writes several fields (e.g. a deadline proposal that also locks the
// plan) therefore never leaves a half-applied record behind.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::action_plan::{ActionPlan, ActionPlanStatus};
use crate::actor::Actor;
use crate::error::GoalError;
use crate::goal::{Goal, GoalStatus, GoalType, MAX_PERCENT};
use crate::review::{self, EditScope, ReviewDecision, Reviewable};

/// Commands accepted by [`apply_goal_transition`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum GoalCommand {
    RequestReview,
    CancelReview,
    LeaderReview(ReviewDecision),
    Edit(GoalEdit),
}

impl GoalCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GoalCommand::RequestReview => "request_review",
            GoalCommand::CancelReview => "cancel_review",
            GoalCommand::LeaderReview(_) => "leader_review",
            GoalCommand::Edit(_) => "edit",
        }
    }
}

/// Member edit of a goal. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GoalEdit {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: Option<GoalType>,
    pub skill: Option<String>,
    pub specific: Option<String>,
    pub measurable: Option<String>,
    pub achievable: Option<String>,
    pub relevant: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub time_bound: Option<NaiveDate>,
    pub success_metric: Option<String>,
    pub weight: Option<u8>,
    pub notes: Option<String>,
    pub status: Option<GoalStatus>,
    pub progress: Option<u8>,
}

impl GoalEdit {
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// Names of the content fields this edit touches.
    fn content_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut touch = |set: bool, name: &'static str| {
            if set {
                fields.push(name);
            }
        };
        touch(self.name.is_some(), "name");
        touch(self.goal_type.is_some(), "type");
        touch(self.skill.is_some(), "skill");
        touch(self.specific.is_some(), "specific");
        touch(self.measurable.is_some(), "measurable");
        touch(self.achievable.is_some(), "achievable");
        touch(self.relevant.is_some(), "relevant");
        touch(self.start_date.is_some(), "start_date");
        touch(self.time_bound.is_some(), "time_bound");
        touch(self.success_metric.is_some(), "success_metric");
        touch(self.weight.is_some(), "weight");
        touch(self.notes.is_some(), "notes");
        fields
    }
}

/// Commands accepted by [`apply_action_plan_transition`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ActionPlanCommand {
    RequestReview,
    CancelReview,
    LeaderReview(ReviewDecision),
    ProposeDeadline { new_date: NaiveDate },
    Edit(ActionPlanEdit),
}

impl ActionPlanCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ActionPlanCommand::RequestReview => "request_review",
            ActionPlanCommand::CancelReview => "cancel_review",
            ActionPlanCommand::LeaderReview(_) => "leader_review",
            ActionPlanCommand::ProposeDeadline { .. } => "propose_deadline",
            ActionPlanCommand::Edit(_) => "edit",
        }
    }
}

/// Member edit of an action plan. The evidence link is the plan's progress
/// signal; the end date moves through `ProposeDeadline` once work has started.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ActionPlanEdit {
    pub activity: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub resources: Option<String>,
    pub expected_outcome: Option<String>,
    pub status: Option<ActionPlanStatus>,
    pub evidence_link: Option<String>,
}

impl ActionPlanEdit {
    fn content_fields(&self) -> Vec<&'static str> {
        [
            (self.activity.is_some(), "activity"),
            (self.start_date.is_some(), "start_date"),
            (self.end_date.is_some(), "end_date"),
            (self.resources.is_some(), "resources"),
            (self.expected_outcome.is_some(), "expected_outcome"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// Apply `command` to a copy of `goal`.
pub fn apply_goal_transition(
    goal: &Goal,
    command: &GoalCommand,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Goal, GoalError> {
    let mut next = goal.clone();
    match command {
        GoalCommand::RequestReview => review::request_review(&mut next, actor)?,
        GoalCommand::CancelReview => review::cancel_review(&mut next, actor)?,
        GoalCommand::LeaderReview(decision) => review::leader_review(&mut next, decision, actor, now)?,
        GoalCommand::Edit(edit) => edit_goal(&mut next, edit, actor)?,
    }
    next.updated_at = Some(now);
    tracing::debug!(
        goal_id = %next.id,
        command = command.name(),
        state = %next.review.state_label(),
        status = %next.status,
        "goal transition applied"
    );
    Ok(next)
}

/// Apply `command` to a copy of `plan`.
pub fn apply_action_plan_transition(
    plan: &ActionPlan,
    command: &ActionPlanCommand,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<ActionPlan, GoalError> {
    let mut next = plan.clone();
    match command {
        ActionPlanCommand::RequestReview => review::request_review(&mut next, actor)?,
        ActionPlanCommand::CancelReview => review::cancel_review(&mut next, actor)?,
        ActionPlanCommand::LeaderReview(decision) => {
            review::leader_review(&mut next, decision, actor, now)?
        }
        ActionPlanCommand::ProposeDeadline { new_date } => next.propose_deadline(*new_date, actor)?,
        ActionPlanCommand::Edit(edit) => edit_action_plan(&mut next, edit, actor)?,
    }
    next.updated_at = Some(now);
    tracing::debug!(
        action_plan_id = %next.id,
        command = command.name(),
        state = %next.review.state_label(),
        status = %next.status,
        "action plan transition applied"
    );
    Ok(next)
}

/// Owner-only hard delete check: the goal must be unlocked and unstarted.
pub fn check_goal_deletable(goal: &Goal, actor: &Actor) -> Result<(), GoalError> {
    actor.require_owner(&goal.user_id, "delete goal")?;
    if !goal.is_deletable() {
        return Err(review::invalid(goal, "delete"));
    }
    Ok(())
}

fn scope_violation<R: Reviewable>(entity: &R, scope: EditScope, fields: &[&str]) -> GoalError {
    review::invalid(
        entity,
        &format!("edit {} (edit scope is {})", fields.join(", "), scope),
    )
}

fn edit_goal(goal: &mut Goal, edit: &GoalEdit, actor: &Actor) -> Result<(), GoalError> {
    actor.require_owner(&goal.user_id, "edit goal")?;
    let scope = goal.edit_scope();

    let content = edit.content_fields();
    if !content.is_empty() && !scope.allows_content() {
        return Err(scope_violation(goal, scope, &content));
    }
    if edit.status.is_some() && !scope.allows_status() {
        return Err(scope_violation(goal, scope, &["status"]));
    }
    if edit.progress.is_some() && !scope.allows_progress() {
        return Err(scope_violation(goal, scope, &["progress"]));
    }
    if let Some(progress) = edit.progress {
        if progress > MAX_PERCENT {
            return Err(GoalError::Validation {
                field: "progress",
                message: format!("{progress} is outside 0-100"),
            });
        }
    }

    if let Some(v) = &edit.name {
        goal.name = v.clone();
    }
    if let Some(v) = edit.goal_type {
        goal.goal_type = v;
    }
    if let Some(v) = &edit.skill {
        goal.skill = v.clone();
    }
    if let Some(v) = &edit.specific {
        goal.specific = v.clone();
    }
    if let Some(v) = &edit.measurable {
        goal.measurable = v.clone();
    }
    if let Some(v) = &edit.achievable {
        goal.achievable = v.clone();
    }
    if let Some(v) = &edit.relevant {
        goal.relevant = v.clone();
    }
    if let Some(v) = edit.start_date {
        goal.start_date = v;
    }
    if let Some(v) = edit.time_bound {
        goal.time_bound = v;
    }
    if let Some(v) = &edit.success_metric {
        goal.success_metric = v.clone();
    }
    if let Some(v) = edit.weight {
        goal.weight = v;
    }
    if let Some(v) = &edit.notes {
        goal.notes = v.clone();
    }
    if let Some(v) = edit.status {
        goal.status = v;
    }
    if let Some(v) = edit.progress {
        goal.progress = v;
    }

    goal.validate()?;
    if goal.status == GoalStatus::Completed && goal.progress < MAX_PERCENT {
        tracing::warn!(
            goal_id = %goal.id,
            progress = goal.progress,
            "goal marked Completed before reaching 100% progress"
        );
    }
    Ok(())
}

fn edit_action_plan(plan: &mut ActionPlan, edit: &ActionPlanEdit, actor: &Actor) -> Result<(), GoalError> {
    actor.require_owner(&plan.owner_id, "edit action plan")?;
    let scope = plan.edit_scope();

    let content = edit.content_fields();
    if !content.is_empty() && !scope.allows_content() {
        return Err(scope_violation(plan, scope, &content));
    }
    if edit.status.is_some() && !scope.allows_status() {
        return Err(scope_violation(plan, scope, &["status"]));
    }
    if edit.evidence_link.is_some() && !scope.allows_progress() {
        return Err(scope_violation(plan, scope, &["evidence_link"]));
    }

    if let Some(v) = &edit.activity {
        plan.activity = v.clone();
    }
    if let Some(v) = edit.start_date {
        plan.start_date = v;
    }
    if let Some(v) = edit.end_date {
        plan.end_date = v;
    }
    if let Some(v) = &edit.resources {
        plan.resources = v.clone();
    }
    if let Some(v) = &edit.expected_outcome {
        plan.expected_outcome = v.clone();
    }
    if let Some(v) = edit.status {
        plan.status = v;
    }
    if let Some(v) = &edit.evidence_link {
        let trimmed = v.trim();
        plan.evidence_link = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    plan.validate()
}
