// weekly_report.rs — A member's weekly progress note against an action plan.
//
// Reports are immutable once written; the only later change is the
// leader's feedback.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action_plan::ActionPlan;
use crate::actor::Actor;
use crate::error::GoalError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyReport {
    pub id: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,

    pub action_plan_id: Uuid,

    pub date: NaiveDate,

    pub summary: String,

    #[serde(default)]
    pub work_done: String,

    #[serde(default)]
    pub blockers_challenges: String,

    #[serde(default)]
    pub next_week_plan: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_feedback: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Member input for a new weekly report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReportDraft {
    pub date: NaiveDate,
    pub summary: String,
    #[serde(default)]
    pub work_done: String,
    #[serde(default)]
    pub blockers_challenges: String,
    #[serde(default)]
    pub next_week_plan: String,
}

impl WeeklyReport {
    /// Write a report for `plan`. Only the plan owner may report.
    pub fn new(
        plan: &ActionPlan,
        draft: WeeklyReportDraft,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Self, GoalError> {
        actor.require_owner(&plan.owner_id, "write a weekly report")?;
        if draft.summary.trim().is_empty() {
            return Err(GoalError::validation("summary", "summary is required"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            goal_id: Some(plan.goal_id),
            action_plan_id: plan.id,
            date: draft.date,
            summary: draft.summary,
            work_done: draft.work_done,
            blockers_challenges: draft.blockers_challenges,
            next_week_plan: draft.next_week_plan,
            lead_feedback: None,
            created_at: Some(now),
        })
    }

    /// Leader-only amendment; every other field stays as written.
    pub fn amend_feedback(&mut self, actor: &Actor, feedback: impl Into<String>) -> Result<(), GoalError> {
        actor.require_reviewer("amend weekly report feedback")?;
        self.lead_feedback = Some(feedback.into());
        Ok(())
    }

    /// Non-blank blocker text, trimmed.
    pub fn blocker(&self) -> Option<&str> {
        let text = self.blockers_challenges.trim();
        (!text.is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_plan::ActionPlanDraft;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
    }

    fn plan() -> ActionPlan {
        ActionPlan::new(
            Uuid::new_v4(),
            "u1",
            ActionPlanDraft {
                activity: "Pair on the parser".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
                resources: String::new(),
                expected_outcome: String::new(),
            },
            now(),
        )
        .unwrap()
    }

    fn draft() -> WeeklyReportDraft {
        WeeklyReportDraft {
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            summary: "Parsed the grammar".to_string(),
            work_done: "tokenizer".to_string(),
            blockers_challenges: "  ".to_string(),
            next_week_plan: "AST".to_string(),
        }
    }

    #[test]
    fn owner_writes_report_linked_to_plan() {
        let plan = plan();
        let report = WeeklyReport::new(&plan, draft(), &Actor::member("u1"), now()).unwrap();
        assert_eq!(report.action_plan_id, plan.id);
        assert_eq!(report.goal_id, Some(plan.goal_id));
        assert!(report.lead_feedback.is_none());
        assert!(report.blocker().is_none());
    }

    #[test]
    fn non_owner_cannot_report() {
        let err = WeeklyReport::new(&plan(), draft(), &Actor::member("u2"), now()).unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }

    #[test]
    fn blank_summary_is_rejected() {
        let mut d = draft();
        d.summary = String::new();
        let err = WeeklyReport::new(&plan(), d, &Actor::member("u1"), now()).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn only_leaders_amend_feedback() {
        let mut report = WeeklyReport::new(&plan(), draft(), &Actor::member("u1"), now()).unwrap();
        assert!(report.amend_feedback(&Actor::member("u1"), "nice").is_err());
        report.amend_feedback(&Actor::leader("l1"), "nice").unwrap();
        assert_eq!(report.lead_feedback.as_deref(), Some("nice"));
        assert_eq!(report.summary, "Parsed the grammar");
    }
}
