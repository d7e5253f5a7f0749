// action_plan.rs — ActionPlan: a time-boxed activity under a goal.
//
// Action plans share the review workflow with goals. They add a deadline
// change sub-workflow: the owner may propose a new end date at most
// `DEADLINE_CHANGE_LIMIT` times, and each proposal re-locks the plan for
// leader review. Approval applies the date, rejection or cancellation
// discards it. A plan that was already approved stays approved either way.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::GoalError;
use crate::review::{LifecyclePhase, ReviewFields, ReviewStatus, Reviewable};
use crate::weekly_report::WeeklyReport;

/// How many times an action plan's deadline may be moved.
pub const DEADLINE_CHANGE_LIMIT: u8 = 3;

/// Work status of an action plan. Wire names match the persisted records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionPlanStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Blocked,
}

impl ActionPlanStatus {
    /// In Progress or Blocked: the plan is expected to report weekly.
    pub fn is_active(self) -> bool {
        matches!(self, ActionPlanStatus::InProgress | ActionPlanStatus::Blocked)
    }
}

impl fmt::Display for ActionPlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionPlanStatus::NotStarted => write!(f, "Not Started"),
            ActionPlanStatus::InProgress => write!(f, "In Progress"),
            ActionPlanStatus::Completed => write!(f, "Completed"),
            ActionPlanStatus::Blocked => write!(f, "Blocked"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionPlan {
    pub id: Uuid,

    pub goal_id: Uuid,

    /// Member who owns the parent goal.
    #[serde(alias = "user_id")]
    pub owner_id: String,

    pub activity: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub status: ActionPlanStatus,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resources: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expected_outcome: String,

    /// Link to proof of the work (document, PR, certificate).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_link: Option<String>,

    /// Proposed end date awaiting leader review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_deadline_date: Option<NaiveDate>,

    #[serde(default)]
    pub deadline_change_count: u8,

    #[serde(flatten)]
    pub review: ReviewFields,

    /// Loaded lazily by the caller; may be empty even when reports exist.
    #[serde(default, alias = "weeklyReports", skip_serializing_if = "Vec::is_empty")]
    pub weekly_reports: Vec<WeeklyReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Stored fields this model does not interpret, written back unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Member input for creating an action plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlanDraft {
    pub activity: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub resources: String,
    #[serde(default)]
    pub expected_outcome: String,
}

impl ActionPlan {
    /// Create a Not Started plan under `goal_id`, owned by `owner`.
    pub fn new(
        goal_id: Uuid,
        owner: impl Into<String>,
        draft: ActionPlanDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, GoalError> {
        if draft.activity.trim().is_empty() {
            return Err(GoalError::validation("activity", "activity is required"));
        }
        let plan = Self {
            id: Uuid::new_v4(),
            goal_id,
            owner_id: owner.into(),
            activity: draft.activity,
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: ActionPlanStatus::NotStarted,
            resources: draft.resources,
            expected_outcome: draft.expected_outcome,
            evidence_link: None,
            request_deadline_date: None,
            deadline_change_count: 0,
            review: ReviewFields::default(),
            weekly_reports: Vec::new(),
            updated_at: Some(now),
            extra: serde_json::Map::new(),
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), GoalError> {
        if self.end_date < self.start_date {
            return Err(GoalError::validation(
                "end_date",
                format!("end date {} is before start date {}", self.end_date, self.start_date),
            ));
        }
        if self.deadline_change_count > DEADLINE_CHANGE_LIMIT {
            return Err(GoalError::validation(
                "deadline_change_count",
                format!(
                    "{} exceeds the limit of {}",
                    self.deadline_change_count, DEADLINE_CHANGE_LIMIT
                ),
            ));
        }
        self.review.validate()?;
        Ok(())
    }

    /// Non-empty evidence link attached.
    pub fn has_evidence(&self) -> bool {
        self.evidence_link
            .as_deref()
            .is_some_and(|link| !link.trim().is_empty())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.end_date < today && self.status != ActionPlanStatus::Completed
    }

    /// A deadline proposal is waiting for the leader.
    pub fn has_pending_deadline_request(&self) -> bool {
        self.request_deadline_date.is_some()
            && self.review.review_status == Some(ReviewStatus::Pending)
    }

    pub fn deadline_changes_left(&self) -> u8 {
        DEADLINE_CHANGE_LIMIT.saturating_sub(self.deadline_change_count)
    }

    /// Propose a new end date. Records the proposal, spends one change, and
    /// locks the plan for leader review in a single step.
    pub fn propose_deadline(&mut self, new_date: NaiveDate, actor: &Actor) -> Result<(), GoalError> {
        actor.require_owner(&self.owner_id, "propose a new action plan deadline")?;
        if self.deadline_change_count >= DEADLINE_CHANGE_LIMIT {
            return Err(GoalError::DeadlineChangeLimitExceeded {
                action_plan_id: self.id,
                limit: DEADLINE_CHANGE_LIMIT,
            });
        }
        if new_date < self.start_date {
            return Err(GoalError::validation(
                "request_deadline_date",
                format!("{} is before start date {}", new_date, self.start_date),
            ));
        }
        self.request_deadline_date = Some(new_date);
        self.deadline_change_count += 1;
        self.review.lock_pending_over_approval();
        tracing::debug!(
            id = %self.id,
            requested = %new_date,
            changes_used = self.deadline_change_count,
            "deadline change proposed"
        );
        Ok(())
    }

    /// Most recent report date for this plan among `reports`.
    pub fn last_report_date<'a>(
        &self,
        reports: impl IntoIterator<Item = &'a WeeklyReport>,
    ) -> Option<NaiveDate> {
        reports
            .into_iter()
            .filter(|r| r.action_plan_id == self.id)
            .map(|r| r.date)
            .max()
    }
}

impl Reviewable for ActionPlan {
    const ENTITY: &'static str = "action plan";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn phase(&self) -> LifecyclePhase {
        match self.status {
            ActionPlanStatus::NotStarted => LifecyclePhase::NotStarted,
            ActionPlanStatus::InProgress | ActionPlanStatus::Blocked => LifecyclePhase::Active,
            ActionPlanStatus::Completed => LifecyclePhase::Closed,
        }
    }

    fn review(&self) -> &ReviewFields {
        &self.review
    }

    fn review_mut(&mut self) -> &mut ReviewFields {
        &mut self.review
    }

    fn on_approved(&mut self) {
        if let Some(requested) = self.request_deadline_date.take() {
            self.end_date = requested;
        }
    }

    fn on_rejected(&mut self) {
        self.request_deadline_date = None;
    }

    fn on_cancelled(&mut self) {
        self.request_deadline_date = None;
    }
}
