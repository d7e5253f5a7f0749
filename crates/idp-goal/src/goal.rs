// goal.rs — Goal: a member's yearly SMART objective.
//
// A Goal owns its action plans and shares the review workflow with them
// through `Reviewable`. Approval of a goal that has not started yet moves
// it to In Progress.

use std::fmt;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action_plan::ActionPlan;
use crate::error::GoalError;
use crate::review::{LifecyclePhase, ReviewFields, Reviewable};

/// Upper bound for `progress` and `weight`.
pub const MAX_PERCENT: u8 = 100;

/// Work status of a goal. Wire names match the persisted records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GoalStatus {
    Draft,
    #[serde(rename = "Not started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl GoalStatus {
    /// Completed and cancelled goals are never overdue.
    pub fn is_terminal(self) -> bool {
        matches!(self, GoalStatus::Completed | GoalStatus::Cancelled)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Draft => write!(f, "Draft"),
            GoalStatus::NotStarted => write!(f, "Not started"),
            GoalStatus::InProgress => write!(f, "In Progress"),
            GoalStatus::Completed => write!(f, "Completed"),
            GoalStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Technical ("Hard") or interpersonal ("Soft") goal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalType {
    Hard,
    #[default]
    Soft,
}

/// How the deadline is derived from the start date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GoalDuration {
    /// Ends on the last day of the start date's calendar quarter.
    Quarter,
    /// Ends the day before the six-month anniversary of the start date.
    HalfYear,
}

impl GoalDuration {
    pub fn deadline_for(self, start: NaiveDate) -> Result<NaiveDate, GoalError> {
        let out_of_range = || GoalError::validation("start_date", format!("{start} is out of range"));
        match self {
            GoalDuration::Quarter => {
                let quarter_end_month = (start.month0() / 3 + 1) * 3;
                let first_of_last_month = NaiveDate::from_ymd_opt(start.year(), quarter_end_month, 1)
                    .ok_or_else(out_of_range)?;
                first_of_last_month
                    .checked_add_months(Months::new(1))
                    .and_then(|d| d.pred_opt())
                    .ok_or_else(out_of_range)
            }
            GoalDuration::HalfYear => start
                .checked_add_months(Months::new(6))
                .and_then(|d| d.pred_opt())
                .ok_or_else(out_of_range),
        }
    }
}

/// A yearly SMART goal owned by a member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,

    /// Owning member.
    pub user_id: String,

    pub year: i32,

    pub name: String,

    #[serde(rename = "type", default)]
    pub goal_type: GoalType,

    #[serde(default)]
    pub skill: String,

    #[serde(default)]
    pub specific: String,

    #[serde(default)]
    pub measurable: String,

    #[serde(default)]
    pub achievable: String,

    #[serde(default)]
    pub relevant: String,

    pub start_date: NaiveDate,

    /// Deadline.
    pub time_bound: NaiveDate,

    #[serde(default)]
    pub success_metric: String,

    pub status: GoalStatus,

    /// 0–100.
    #[serde(default)]
    pub weight: u8,

    /// 0–100.
    #[serde(default)]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_type: Option<GoalDuration>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(flatten)]
    pub review: ReviewFields,

    #[serde(default, alias = "actionPlans", skip_serializing_if = "Vec::is_empty")]
    pub action_plans: Vec<ActionPlan>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Stored fields this model does not interpret (e.g. `risk`,
    /// `dependencies`, `user_email`), written back unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Member input for creating a goal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalDraft {
    pub name: String,
    #[serde(rename = "type", default)]
    pub goal_type: GoalType,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub specific: String,
    #[serde(default)]
    pub measurable: String,
    #[serde(default)]
    pub achievable: String,
    #[serde(default)]
    pub relevant: String,
    pub start_date: Option<NaiveDate>,
    /// Explicit deadline; derived from `duration_type` when absent.
    #[serde(default)]
    pub time_bound: Option<NaiveDate>,
    #[serde(default)]
    pub duration_type: Option<GoalDuration>,
    #[serde(default)]
    pub success_metric: String,
    #[serde(default)]
    pub weight: u8,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub notes: String,
}

impl Goal {
    /// Create a goal in the Not started, unlocked, unreviewed state.
    pub fn new(draft: GoalDraft, owner: impl Into<String>, now: DateTime<Utc>) -> Result<Self, GoalError> {
        if draft.name.trim().is_empty() {
            return Err(GoalError::validation("name", "goal title is required"));
        }
        let start_date = draft
            .start_date
            .ok_or_else(|| GoalError::validation("start_date", "start date is required"))?;
        let time_bound = match (draft.time_bound, draft.duration_type) {
            (Some(deadline), _) => deadline,
            (None, Some(duration)) => duration.deadline_for(start_date)?,
            (None, None) => {
                return Err(GoalError::validation(
                    "time_bound",
                    "deadline is required when no duration type is given",
                ))
            }
        };

        let goal = Self {
            id: Uuid::new_v4(),
            user_id: owner.into(),
            year: start_date.year(),
            name: draft.name,
            goal_type: draft.goal_type,
            skill: draft.skill,
            specific: draft.specific,
            measurable: draft.measurable,
            achievable: draft.achievable,
            relevant: draft.relevant,
            start_date,
            time_bound,
            success_metric: draft.success_metric,
            status: GoalStatus::NotStarted,
            weight: draft.weight,
            progress: draft.progress,
            duration_type: draft.duration_type,
            notes: draft.notes,
            review: ReviewFields::default(),
            action_plans: Vec::new(),
            updated_at: Some(now),
            extra: serde_json::Map::new(),
        };
        goal.validate()?;
        Ok(goal)
    }

    /// Check ranges, date order, and lock/review consistency.
    pub fn validate(&self) -> Result<(), GoalError> {
        if self.progress > MAX_PERCENT {
            return Err(GoalError::validation(
                "progress",
                format!("{} is outside 0-100", self.progress),
            ));
        }
        if self.weight > MAX_PERCENT {
            return Err(GoalError::validation(
                "weight",
                format!("{} is outside 0-100", self.weight),
            ));
        }
        if self.time_bound < self.start_date {
            return Err(GoalError::validation(
                "time_bound",
                format!(
                    "deadline {} is before start date {}",
                    self.time_bound, self.start_date
                ),
            ));
        }
        self.review.validate()?;
        Ok(())
    }

    /// Only an unlocked goal that has not started may be hard-deleted.
    pub fn is_deletable(&self) -> bool {
        !self.review.is_locked && matches!(self.status, GoalStatus::NotStarted | GoalStatus::Draft)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.time_bound < today && !self.status.is_terminal()
    }
}

impl Reviewable for Goal {
    const ENTITY: &'static str = "goal";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }

    fn phase(&self) -> LifecyclePhase {
        match self.status {
            GoalStatus::Draft | GoalStatus::NotStarted => LifecyclePhase::NotStarted,
            GoalStatus::InProgress => LifecyclePhase::Active,
            GoalStatus::Completed | GoalStatus::Cancelled => LifecyclePhase::Closed,
        }
    }

    fn review(&self) -> &ReviewFields {
        &self.review
    }

    fn review_mut(&mut self) -> &mut ReviewFields {
        &mut self.review
    }

    fn on_approved(&mut self) {
        if matches!(self.status, GoalStatus::NotStarted | GoalStatus::Draft) {
            self.status = GoalStatus::InProgress;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReviewStatus;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> GoalDraft {
        GoalDraft {
            name: "Learn Rust".to_string(),
            start_date: Some(date(2025, 2, 10)),
            duration_type: Some(GoalDuration::Quarter),
            weight: 30,
            ..GoalDraft::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_goal_starts_unlocked_and_not_started() {
        let goal = Goal::new(draft(), "u1", now()).unwrap();
        assert_eq!(goal.status, GoalStatus::NotStarted);
        assert!(!goal.review.is_locked);
        assert!(goal.review.review_status.is_none());
        assert_eq!(goal.time_bound, date(2025, 3, 31));
        assert_eq!(goal.year, 2025);
    }

    #[test]
    fn quarter_deadlines() {
        let q = GoalDuration::Quarter;
        assert_eq!(q.deadline_for(date(2025, 1, 1)).unwrap(), date(2025, 3, 31));
        assert_eq!(q.deadline_for(date(2025, 5, 17)).unwrap(), date(2025, 6, 30));
        assert_eq!(q.deadline_for(date(2025, 9, 30)).unwrap(), date(2025, 9, 30));
        assert_eq!(q.deadline_for(date(2025, 11, 2)).unwrap(), date(2025, 12, 31));
    }

    #[test]
    fn half_year_deadline_is_rolling() {
        let h = GoalDuration::HalfYear;
        assert_eq!(h.deadline_for(date(2025, 3, 15)).unwrap(), date(2025, 9, 14));
        assert_eq!(h.deadline_for(date(2025, 7, 1)).unwrap(), date(2025, 12, 31));
    }

    #[test]
    fn new_goal_requires_name_and_dates() {
        let mut d = draft();
        d.name = "  ".to_string();
        assert_eq!(Goal::new(d, "u1", now()).unwrap_err().kind(), "validation_error");

        let mut d = draft();
        d.duration_type = None;
        assert!(Goal::new(d, "u1", now()).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_progress() {
        let mut goal = Goal::new(draft(), "u1", now()).unwrap();
        goal.progress = 101;
        assert!(matches!(
            goal.validate(),
            Err(GoalError::Validation { field: "progress", .. })
        ));
    }

    #[test]
    fn validate_rejects_deadline_before_start() {
        let mut d = draft();
        d.time_bound = Some(date(2025, 1, 1));
        assert!(Goal::new(d, "u1", now()).is_err());
    }

    #[test]
    fn approval_advances_unstarted_goal() {
        let mut goal = Goal::new(draft(), "u1", now()).unwrap();
        goal.on_approved();
        assert_eq!(goal.status, GoalStatus::InProgress);

        goal.status = GoalStatus::Completed;
        goal.on_approved();
        assert_eq!(goal.status, GoalStatus::Completed);
    }

    #[test]
    fn deletable_only_when_unlocked_and_unstarted() {
        let mut goal = Goal::new(draft(), "u1", now()).unwrap();
        assert!(goal.is_deletable());
        goal.review.is_locked = true;
        goal.review.review_status = Some(ReviewStatus::Pending);
        assert!(!goal.is_deletable());
        goal.review.is_locked = false;
        goal.review.review_status = None;
        goal.status = GoalStatus::InProgress;
        assert!(!goal.is_deletable());
    }

    #[test]
    fn deserializes_persisted_record() {
        let json = r#"{
            "id": "6a1c2f0e-8a55-4e7b-9d0c-3f1b2a4c5d6e",
            "user_id": "u1",
            "year": 2025,
            "name": "Ship the API",
            "type": "Hard",
            "start_date": "2025-01-01",
            "time_bound": "2025-12-31",
            "status": "In Progress",
            "progress": 40,
            "weight": 20,
            "is_locked": true,
            "review_status": "Approved",
            "actionPlans": []
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.status, GoalStatus::InProgress);
        assert_eq!(goal.goal_type, GoalType::Hard);
        assert_eq!(goal.review.review_status, Some(ReviewStatus::Approved));
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn unknown_fields_survive_a_rewrite() {
        let json = r#"{
            "id": "6a1c2f0e-8a55-4e7b-9d0c-3f1b2a4c5d6e",
            "user_id": "u1",
            "user_name": "Uma",
            "user_email": "uma@example.com",
            "team": "platform",
            "year": 2025,
            "name": "Ship the API",
            "start_date": "2025-01-01",
            "time_bound": "2025-12-31",
            "status": "Not started",
            "risk": "Medium",
            "dependencies": ["infra budget"],
            "review_status": "Rejected",
            "actionPlans": [{
                "id": "7b2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
                "goal_id": "6a1c2f0e-8a55-4e7b-9d0c-3f1b2a4c5d6e",
                "owner_id": "u1",
                "activity": "Draft the schema",
                "start_date": "2025-01-06",
                "end_date": "2025-02-28",
                "status": "Not Started",
                "user_email": "uma@example.com"
            }]
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.extra["risk"], "Medium");
        assert_eq!(goal.extra["team"], "platform");
        assert!(!goal.extra.contains_key("review_status"));
        assert!(!goal.extra.contains_key("actionPlans"));
        assert_eq!(goal.action_plans[0].extra["user_email"], "uma@example.com");

        let rewritten: Goal = serde_json::from_str(&serde_json::to_string(&goal).unwrap()).unwrap();
        assert_eq!(rewritten, goal);
        assert_eq!(rewritten.extra["dependencies"], serde_json::json!(["infra budget"]));
        assert_eq!(rewritten.extra["user_name"], "Uma");
        assert_eq!(rewritten.review.review_status, Some(ReviewStatus::Rejected));
    }

    #[test]
    fn overdue_ignores_terminal_status() {
        let mut goal = Goal::new(draft(), "u1", now()).unwrap();
        assert!(goal.is_overdue(date(2025, 4, 1)));
        assert!(!goal.is_overdue(date(2025, 3, 31)));
        goal.status = GoalStatus::Cancelled;
        assert!(!goal.is_overdue(date(2025, 4, 1)));
    }
}
