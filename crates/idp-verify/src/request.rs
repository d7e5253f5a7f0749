// request.rs — Verification requests: submit, review, cancel.
//
// A request is created Pending by the goal owner and ends either Reviewed
// (with exactly one review attached) or Cancelled. Both end states are
// terminal; asking again means submitting a new request.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use idp_goal::{Actor, Goal};

use crate::error::VerifyError;
use crate::rubric::{evidence_checklist, score_rubric, CriterionScore, EvidenceChecklist, RubricScore};
use crate::template::{
    normalize_criteria, NormalizedCriterion, RequiredEvidence, RubricSnapshot, VerificationTemplate,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VerificationStatus {
    Pending,
    Reviewed,
    Cancelled,
}

impl VerificationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, VerificationStatus::Pending)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "Pending"),
            VerificationStatus::Reviewed => write!(f, "Reviewed"),
            VerificationStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// The leader's verdict. Chosen by hand, never derived from the score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReviewResult {
    Pass,
    NeedsWork,
    Fail,
}

impl fmt::Display for ReviewResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewResult::Pass => write!(f, "Pass"),
            ReviewResult::NeedsWork => write!(f, "NeedsWork"),
            ReviewResult::Fail => write!(f, "Fail"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationReview {
    pub leader_id: String,
    pub result: ReviewResult,
    #[serde(default)]
    pub scores: BTreeMap<String, CriterionScore>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub leader_feedback: String,
    pub reviewed_at: DateTime<Utc>,
    pub score: RubricScore,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationRequest {
    pub id: Uuid,
    pub requester_id: String,
    pub goal_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_plan_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub scope: String,
    #[serde(default)]
    pub evidence_links: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub member_notes: String,
    #[serde(default)]
    pub rubric_snapshot: RubricSnapshot,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<VerificationReview>,
}

/// What a member fills in when asking for verification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    #[serde(default)]
    pub action_plan_id: Option<Uuid>,
    #[serde(default)]
    pub template_id: Option<String>,
    pub scope: String,
    #[serde(default)]
    pub evidence_links: Vec<String>,
    #[serde(default)]
    pub member_notes: String,
}

/// What a leader fills in when grading a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub result: ReviewResult,
    #[serde(default)]
    pub scores: BTreeMap<String, CriterionScore>,
    #[serde(default)]
    pub leader_feedback: String,
}

impl VerificationRequest {
    /// Create a Pending request for `goal`. With a template, the evidence
    /// count must cover the template's required items and the template is
    /// frozen into `rubric_snapshot`.
    pub fn submit(
        goal: &Goal,
        submission: Submission,
        requester: &Actor,
        templates: &[VerificationTemplate],
        now: DateTime<Utc>,
    ) -> Result<Self, VerifyError> {
        requester.require_owner(&goal.user_id, "request verification")?;

        let scope = submission.scope.trim().to_string();
        if scope.is_empty() {
            return Err(VerifyError::validation("scope", "must not be empty"));
        }

        if let Some(plan_id) = submission.action_plan_id {
            if !goal.action_plans.is_empty() && !goal.action_plans.iter().any(|p| p.id == plan_id) {
                return Err(VerifyError::validation(
                    "action_plan_id",
                    format!("action plan {plan_id} does not belong to goal {}", goal.id),
                ));
            }
        }

        let evidence_links: Vec<String> = submission
            .evidence_links
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        let template_id = submission
            .template_id
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let rubric_snapshot = match &template_id {
            Some(tid) => {
                let template = find_template(templates, tid)?;
                let required = template.required_evidence_count();
                if evidence_links.len() < required {
                    return Err(VerifyError::validation(
                        "evidence_links",
                        format!("template requires {required} evidence link(s), got {}", evidence_links.len()),
                    ));
                }
                template.snapshot()
            }
            None => RubricSnapshot::default(),
        };

        let request = Self {
            id: Uuid::new_v4(),
            requester_id: requester.id.clone(),
            goal_id: goal.id,
            action_plan_id: submission.action_plan_id,
            template_id,
            scope,
            evidence_links,
            member_notes: submission.member_notes.trim().to_string(),
            rubric_snapshot,
            status: VerificationStatus::Pending,
            created_at: now,
            updated_at: Some(now),
            review: None,
        };
        tracing::debug!(
            request_id = %request.id,
            goal_id = %goal.id,
            template = ?request.template_id,
            "verification requested"
        );
        Ok(request)
    }

    /// Criteria to grade against: the snapshot when it has any, else the
    /// live template.
    pub fn effective_criteria(&self, templates: &[VerificationTemplate]) -> Vec<NormalizedCriterion> {
        if !self.rubric_snapshot.criteria.is_empty() {
            return normalize_criteria(&self.rubric_snapshot.criteria);
        }
        self.live_template(templates)
            .map(|t| normalize_criteria(&t.criteria))
            .unwrap_or_default()
    }

    pub fn effective_required_evidence(&self, templates: &[VerificationTemplate]) -> Vec<RequiredEvidence> {
        if !self.rubric_snapshot.required_evidence.is_empty() {
            return self.rubric_snapshot.required_evidence.clone();
        }
        self.live_template(templates)
            .map(|t| t.required_evidence.clone())
            .unwrap_or_default()
    }

    /// Display-only passing threshold.
    pub fn minimum_bar<'a>(&'a self, templates: &'a [VerificationTemplate]) -> Option<&'a serde_json::Value> {
        self.rubric_snapshot
            .minimum_bar
            .as_ref()
            .or_else(|| self.live_template(templates).and_then(|t| t.minimum_bar.as_ref()))
    }

    pub fn score(&self, scores: &BTreeMap<String, CriterionScore>, templates: &[VerificationTemplate]) -> RubricScore {
        score_rubric(&self.effective_criteria(templates), scores)
    }

    /// Effective criteria, failing when `scores` names a criterion outside them.
    pub fn check_scores(
        &self,
        scores: &BTreeMap<String, CriterionScore>,
        templates: &[VerificationTemplate],
    ) -> Result<Vec<NormalizedCriterion>, VerifyError> {
        let criteria = self.effective_criteria(templates);
        if let Some(unknown) = scores.keys().find(|id| !criteria.iter().any(|c| &c.id == *id)) {
            return Err(VerifyError::validation(
                "scores",
                format!("unknown criterion id {unknown}"),
            ));
        }
        Ok(criteria)
    }

    pub fn checklist(&self, templates: &[VerificationTemplate]) -> EvidenceChecklist {
        evidence_checklist(&self.effective_required_evidence(templates), &self.evidence_links)
    }

    /// Grade a Pending request. Returns the Reviewed copy.
    pub fn review(
        &self,
        reviewer: &Actor,
        verdict: Verdict,
        templates: &[VerificationTemplate],
        now: DateTime<Utc>,
    ) -> Result<Self, VerifyError> {
        reviewer.require_reviewer("review verification")?;
        if reviewer.id == self.requester_id {
            return Err(VerifyError::validation(
                "reviewer",
                "requester cannot review their own verification",
            ));
        }
        self.require_pending("review")?;

        let criteria = self.check_scores(&verdict.scores, templates)?;
        let score = score_rubric(&criteria, &verdict.scores);
        let mut next = self.clone();
        next.status = VerificationStatus::Reviewed;
        next.updated_at = Some(now);
        next.review = Some(VerificationReview {
            leader_id: reviewer.id.clone(),
            result: verdict.result,
            scores: verdict.scores,
            leader_feedback: verdict.leader_feedback.trim().to_string(),
            reviewed_at: now,
            score,
        });
        tracing::debug!(
            request_id = %self.id,
            result = %verdict.result,
            avg_on_5 = score.avg_on_5,
            "verification reviewed"
        );
        Ok(next)
    }

    /// Withdraw a Pending request. Returns the Cancelled copy.
    pub fn cancel(&self, requester: &Actor, now: DateTime<Utc>) -> Result<Self, VerifyError> {
        requester.require_owner(&self.requester_id, "cancel verification")?;
        self.require_pending("cancel")?;
        let mut next = self.clone();
        next.status = VerificationStatus::Cancelled;
        next.updated_at = Some(now);
        tracing::debug!(request_id = %self.id, "verification cancelled");
        Ok(next)
    }

    fn require_pending(&self, command: &'static str) -> Result<(), VerifyError> {
        if self.status.is_terminal() {
            return Err(VerifyError::InvalidTransition {
                id: self.id,
                status: self.status.to_string(),
                command,
            });
        }
        Ok(())
    }

    fn live_template<'a>(&self, templates: &'a [VerificationTemplate]) -> Option<&'a VerificationTemplate> {
        let tid = self.template_id.as_deref()?;
        templates.iter().find(|t| t.id == tid)
    }
}

fn find_template<'a>(
    templates: &'a [VerificationTemplate],
    id: &str,
) -> Result<&'a VerificationTemplate, VerifyError> {
    templates
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| VerifyError::validation("template_id", format!("unknown template {id}")))
}
