// bundle.rs — Output records of an insight pass.
//
// Everything here is derived and read-only. Rates are fractions in 0..=1
// rounded to two decimals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::week::WindowRange;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthCounts {
    pub on_track: usize,
    pub at_risk: usize,
    pub high_risk: usize,
    /// In Progress goals with no weekly report inside the window.
    pub stagnant: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GoalSummary {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub health: HealthCounts,
    pub progress_avg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub total: usize,
    pub overdue: usize,
    pub completed: usize,
    pub completed_with_evidence: usize,
    pub evidence_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockerCount {
    pub text: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub reports_in_window: usize,
    pub weeks_with_activity: u32,
    pub streak_weeks: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_blockers: Vec<BlockerCount>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationCounts {
    pub pending: usize,
    pub reviewed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberSummary {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub goals: GoalSummary,
    pub action_plans: PlanSummary,
    pub weekly_reports: ReportSummary,
    /// Reports per window week, oldest first.
    pub reports_by_week: Vec<usize>,
    pub verifications: VerificationCounts,
    /// Average week-over-week progress change; `None` without history.
    pub progress_delta: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamSummary {
    pub team_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub member_count: usize,
    /// Members with a report in the current week.
    pub active_members: usize,
    pub goals: GoalSummary,
    pub action_plans: PlanSummary,
    pub reports_in_window: usize,
    pub progress_delta: Option<f64>,
    /// Rankings among this team's members only.
    pub leaderboards: Leaderboards,
}

/// Roll-up over every member in scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScopeSummary {
    pub members: usize,
    pub goals: GoalSummary,
    pub action_plans: PlanSummary,
    pub reports_in_window: usize,
    pub progress_delta: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekTrend {
    /// Monday of the week.
    pub week: NaiveDate,
    pub active_members: usize,
    pub active_rate: f64,
    pub reports: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Leaderboards {
    pub top_streak: Vec<LeaderboardEntry>,
    pub top_evidence_rate: Vec<LeaderboardEntry>,
    pub top_progress_delta: Vec<LeaderboardEntry>,
    pub bottom_streak: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverdueGoal {
    pub goal_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub time_bound: NaiveDate,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverduePlan {
    pub action_plan_id: Uuid,
    pub goal_id: Uuid,
    pub owner_id: String,
    pub activity: String,
    pub end_date: NaiveDate,
    pub days_overdue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissingReport {
    pub action_plan_id: Uuid,
    pub goal_id: Uuid,
    pub owner_id: String,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_report_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeadlineRequest {
    pub action_plan_id: Uuid,
    pub goal_id: Uuid,
    pub owner_id: String,
    pub current_end_date: NaiveDate,
    pub requested_end_date: NaiveDate,
    pub changes_used: u8,
}

/// An entity left out of the pass because it failed validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedEntity {
    /// `goal`, `action_plan` or `weekly_report`.
    pub kind: String,
    pub id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightBundle {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub window: WindowRange,
    pub overdue_goals: Vec<OverdueGoal>,
    pub overdue_action_plans: Vec<OverduePlan>,
    pub missing_reports: Vec<MissingReport>,
    pub pending_deadline_requests: Vec<DeadlineRequest>,
    pub totals: ScopeSummary,
    pub members: Vec<MemberSummary>,
    pub teams: Vec<TeamSummary>,
    pub trends: Vec<WeekTrend>,
    pub leaderboards: Leaderboards,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntity>,
}

impl InsightBundle {
    pub fn member(&self, user_id: &str) -> Option<&MemberSummary> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn team(&self, team_id: &str) -> Option<&TeamSummary> {
        self.teams.iter().find(|t| t.team_id == team_id)
    }
}
