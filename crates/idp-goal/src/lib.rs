//! # idp-goal
//!
//! Goal and action plan records, their review-and-lock workflow, and the
//! health evaluator used by member and leader views.
//!
//! A [`Goal`] is a member's yearly SMART objective; each goal owns
//! [`ActionPlan`]s, and each plan collects [`WeeklyReport`]s. Goals and
//! plans share one review workflow through the [`Reviewable`] trait:
//!
//! - request review → locked, Pending
//! - cancel review → unlocked, Cancelled
//! - leader decision → Approved (stays locked) or Rejected (unlocked)
//!
//! Action plans add a capped deadline-change request that re-locks the plan
//! until a leader approves or rejects the new date.
//!
//! ## Key components
//!
//! - [`apply_goal_transition`] / [`apply_action_plan_transition`] — command
//!   entry points; they return an updated copy or a [`GoalError`]
//! - [`EditScope`] — which fields a member may still change
//! - [`evaluate_goal_health`] / [`evaluate_action_plan_health`] — On Track,
//!   At Risk, or High Risk from elapsed time vs. progress
//!
//! Nothing here reads the system clock: every time-dependent call takes `now`.

pub mod action_plan;
pub mod actor;
pub mod error;
pub mod goal;
pub mod health;
pub mod review;
pub mod transition;
pub mod weekly_report;

pub use action_plan::{ActionPlan, ActionPlanDraft, ActionPlanStatus, DEADLINE_CHANGE_LIMIT};
pub use actor::{Actor, Role};
pub use error::GoalError;
pub use goal::{Goal, GoalDraft, GoalDuration, GoalStatus, GoalType};
pub use health::{
    evaluate_action_plan_health, evaluate_action_plan_health_with, evaluate_goal_health,
    evaluate_goal_health_with, expected_progress, start_of_day, HealthConfig, HealthTier,
};
pub use review::{
    EditScope, LifecyclePhase, ReviewDecision, ReviewFields, ReviewOutcome, ReviewState,
    ReviewStatus, Reviewable,
};
pub use transition::{
    apply_action_plan_transition, apply_goal_transition, check_goal_deletable, ActionPlanCommand,
    ActionPlanEdit, GoalCommand, GoalEdit,
};
pub use weekly_report::{WeeklyReport, WeeklyReportDraft};
