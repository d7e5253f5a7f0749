// review.rs — The review-and-lock workflow shared by goals and action plans.
//
// Both entities carry the same review fields (lock flag, review status,
// audit stamps, leader notes). The `Reviewable` trait exposes those fields
// plus a few per-entity hooks, so the transitions below are written once:
//
//   unlocked ──request_review──▶ pending_review ──approve──▶ approved_locked
//       ▲                          │      │
//       └────────cancel_review─────┘      └──reject──▶ rejected_unlocked
//                                                          │
//                              pending_review ◀─request_review─┘
//
// A deadline proposal on an approved plan re-enters pending_review on top of
// the approval. Cancelling or rejecting that request returns the plan to
// approved_locked; only the requested date is discarded.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::GoalError;

/// Leader decision status stored on a goal or action plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "Pending"),
            ReviewStatus::Approved => write!(f, "Approved"),
            ReviewStatus::Rejected => write!(f, "Rejected"),
            ReviewStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Workflow state derived from `(review_status, is_locked)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Never reviewed, or the last request was cancelled.
    Unlocked,
    /// Submitted and waiting for a leader decision.
    PendingReview,
    /// Approved; stays locked for good.
    ApprovedLocked,
    /// Rejected; the owner may revise and resubmit.
    RejectedUnlocked,
}

impl ReviewState {
    /// Returns `None` for combinations the workflow never produces
    /// (e.g. locked with a Rejected status).
    pub fn derive(review_status: Option<ReviewStatus>, is_locked: bool) -> Option<Self> {
        match (review_status, is_locked) {
            (None | Some(ReviewStatus::Cancelled), false) => Some(ReviewState::Unlocked),
            (Some(ReviewStatus::Pending), true) => Some(ReviewState::PendingReview),
            (Some(ReviewStatus::Approved), true) => Some(ReviewState::ApprovedLocked),
            (Some(ReviewStatus::Rejected), false) => Some(ReviewState::RejectedUnlocked),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewState::Unlocked => write!(f, "unlocked"),
            ReviewState::PendingReview => write!(f, "pending_review"),
            ReviewState::ApprovedLocked => write!(f, "approved_locked"),
            ReviewState::RejectedUnlocked => write!(f, "rejected_unlocked"),
        }
    }
}

/// Coarse lifecycle phase used to narrow member edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    NotStarted,
    Active,
    Closed,
}

/// Which fields a member may change right now.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditScope {
    /// Any content field.
    Full,
    /// Only the progress signal.
    ProgressOnly,
    /// Progress plus the work status.
    StatusAndProgress,
    /// Nothing.
    None,
}

impl EditScope {
    pub fn compute(
        phase: LifecyclePhase,
        is_locked: bool,
        review_status: Option<ReviewStatus>,
    ) -> Self {
        if phase == LifecyclePhase::Closed {
            return EditScope::None;
        }
        if is_locked {
            return match review_status {
                Some(ReviewStatus::Pending | ReviewStatus::Approved) => EditScope::ProgressOnly,
                // Locked without a live review is not a state we produce; refuse edits.
                _ => EditScope::None,
            };
        }
        match phase {
            LifecyclePhase::NotStarted => EditScope::Full,
            _ => EditScope::StatusAndProgress,
        }
    }

    pub fn allows_content(self) -> bool {
        self == EditScope::Full
    }

    pub fn allows_status(self) -> bool {
        matches!(self, EditScope::Full | EditScope::StatusAndProgress)
    }

    pub fn allows_progress(self) -> bool {
        self != EditScope::None
    }
}

impl fmt::Display for EditScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditScope::Full => write!(f, "full"),
            EditScope::ProgressOnly => write!(f, "progress_only"),
            EditScope::StatusAndProgress => write!(f, "status_and_progress"),
            EditScope::None => write!(f, "none"),
        }
    }
}

/// Review fields embedded (flattened) in both goals and action plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewFields {
    #[serde(default)]
    pub is_locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_status: Option<ReviewStatus>,

    /// Identity of the leader who last acted on the review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_review_notes: Option<String>,

    /// Approval the current pending request sits on. Set only while Pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_review_status: Option<ReviewStatus>,
}

impl ReviewFields {
    pub fn state(&self) -> Option<ReviewState> {
        ReviewState::derive(self.review_status, self.is_locked)
    }

    /// Human label for error messages; includes the raw pair when inconsistent.
    pub fn state_label(&self) -> String {
        match self.state() {
            Some(state) => state.to_string(),
            None => format!(
                "inconsistent (review_status={:?}, is_locked={})",
                self.review_status, self.is_locked
            ),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.is_locked && self.review_status == Some(ReviewStatus::Pending)
    }

    /// Fails unless the lock flag and review status form a known state.
    pub fn validate(&self) -> Result<ReviewState, GoalError> {
        let state = self.state().ok_or_else(|| {
            GoalError::validation(
                "is_locked",
                format!(
                    "lock flag {} does not match review status {:?}",
                    self.is_locked, self.review_status
                ),
            )
        })?;
        match self.prior_review_status {
            None => {}
            Some(ReviewStatus::Approved) if state == ReviewState::PendingReview => {}
            Some(prior) => {
                return Err(GoalError::validation(
                    "prior_review_status",
                    format!("{prior} cannot be held under state {state}"),
                ))
            }
        }
        Ok(state)
    }

    pub(crate) fn lock_pending(&mut self) {
        self.is_locked = true;
        self.review_status = Some(ReviewStatus::Pending);
    }

    /// Lock for review, remembering an approval the request is raised on.
    pub(crate) fn lock_pending_over_approval(&mut self) {
        if self.review_status == Some(ReviewStatus::Approved) {
            self.prior_review_status = Some(ReviewStatus::Approved);
        }
        self.lock_pending();
    }

    /// Put back the approval a pending request was raised on, if any.
    fn restore_approval(&mut self) -> bool {
        if self.prior_review_status.take() != Some(ReviewStatus::Approved) {
            return false;
        }
        self.review_status = Some(ReviewStatus::Approved);
        self.is_locked = true;
        true
    }
}

/// Outcome a leader may record on a pending review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReviewOutcome {
    Approved,
    Rejected,
    /// Keep the request open; only notes and reviewer stamps change.
    Pending,
}

/// A leader's decision payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewDecision {
    pub outcome: ReviewOutcome,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReviewDecision {
    pub fn approve() -> Self {
        Self {
            outcome: ReviewOutcome::Approved,
            notes: None,
        }
    }

    pub fn reject(notes: impl Into<String>) -> Self {
        Self {
            outcome: ReviewOutcome::Rejected,
            notes: Some(notes.into()),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The review capability shared by goals and action plans.
pub trait Reviewable {
    /// Entity name used in errors and logs ("goal", "action plan").
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> &str;
    fn phase(&self) -> LifecyclePhase;
    fn review(&self) -> &ReviewFields;
    fn review_mut(&mut self) -> &mut ReviewFields;

    fn edit_scope(&self) -> EditScope {
        let review = self.review();
        EditScope::compute(self.phase(), review.is_locked, review.review_status)
    }

    /// Called after the review status becomes Approved.
    fn on_approved(&mut self) {}

    /// Called after the review status becomes Rejected.
    fn on_rejected(&mut self) {}

    /// Called after a pending request is withdrawn.
    fn on_cancelled(&mut self) {}
}

pub(crate) fn invalid<R: Reviewable>(entity: &R, command: &str) -> GoalError {
    GoalError::InvalidTransition {
        entity: R::ENTITY,
        id: entity.id(),
        from: entity.review().state_label(),
        command: command.to_string(),
    }
}

/// Owner submits the entity for leader review, locking it.
pub fn request_review<R: Reviewable>(entity: &mut R, actor: &Actor) -> Result<(), GoalError> {
    actor.require_owner(entity.owner_id(), &format!("request review of {}", R::ENTITY))?;
    let review = entity.review();
    if review.is_locked || review.review_status == Some(ReviewStatus::Approved) {
        return Err(invalid(entity, "request_review"));
    }
    entity.review_mut().lock_pending();
    tracing::debug!(entity = R::ENTITY, id = %entity.id(), "review requested");
    Ok(())
}

/// Owner withdraws a request that no leader has acted on yet. A request
/// raised on an approved entity falls back to that approval.
pub fn cancel_review<R: Reviewable>(entity: &mut R, actor: &Actor) -> Result<(), GoalError> {
    actor.require_owner(entity.owner_id(), &format!("cancel review of {}", R::ENTITY))?;
    if !entity.review().is_pending() {
        return Err(invalid(entity, "cancel_review"));
    }
    let review = entity.review_mut();
    if !review.restore_approval() {
        review.is_locked = false;
        review.review_status = Some(ReviewStatus::Cancelled);
    }
    entity.on_cancelled();
    tracing::debug!(entity = R::ENTITY, id = %entity.id(), "review cancelled");
    Ok(())
}

/// Leader records a decision on a pending review.
pub fn leader_review<R: Reviewable>(
    entity: &mut R,
    decision: &ReviewDecision,
    reviewer: &Actor,
    now: DateTime<Utc>,
) -> Result<(), GoalError> {
    reviewer.require_reviewer(&format!("review {}", R::ENTITY))?;
    if entity.review().review_status != Some(ReviewStatus::Pending) {
        return Err(invalid(entity, "leader_review"));
    }

    let review = entity.review_mut();
    review.leader_review_notes = decision.notes.clone();
    review.reviewed_by = Some(reviewer.id.clone());
    review.reviewed_at = Some(now);

    match decision.outcome {
        ReviewOutcome::Approved => {
            review.prior_review_status = None;
            review.review_status = Some(ReviewStatus::Approved);
            review.is_locked = true;
            review.approved_at = Some(now);
            entity.on_approved();
        }
        ReviewOutcome::Rejected => {
            review.rejected_at = Some(now);
            if !review.restore_approval() {
                review.review_status = Some(ReviewStatus::Rejected);
                review.is_locked = false;
            }
            entity.on_rejected();
        }
        ReviewOutcome::Pending => {
            review.is_locked = true;
        }
    }

    tracing::debug!(
        entity = R::ENTITY,
        id = %entity.id(),
        outcome = ?decision.outcome,
        reviewer = %reviewer.id,
        "review decided"
    );
    Ok(())
}
