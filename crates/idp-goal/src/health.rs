// health.rs — Three-tier risk label from expected vs. actual progress.
//
// Expected progress is the share of the goal (or plan) window that has
// elapsed at `now`. A goal is compared on its `progress` field; an action
// plan has no numeric progress, so its status stands in for it, minus a
// penalty when its reports have gone stale.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action_plan::{ActionPlan, ActionPlanStatus};
use crate::goal::Goal;
use crate::weekly_report::WeeklyReport;

/// Gap (expected − actual) beyond which a goal is At Risk.
pub const AT_RISK_GAP: i32 = 10;
/// Gap beyond which a goal is High Risk.
pub const HIGH_RISK_GAP: i32 = 20;
/// Days without a weekly report before a plan counts as stale.
pub const STALE_REPORT_DAYS: i64 = 14;
/// Points removed from a stale plan's progress proxy.
pub const STALE_PENALTY: i32 = 10;
/// The stale penalty only applies once this much of the window elapsed.
pub const STALE_MIN_EXPECTED: i32 = 20;
/// Progress proxy for an In Progress plan.
pub const IN_PROGRESS_PROXY: i32 = 50;
/// Progress proxy for a Blocked plan.
pub const BLOCKED_PROXY: i32 = 20;
/// Progress proxy for a Not Started plan.
pub const NOT_STARTED_PROXY: i32 = 0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    OnTrack,
    AtRisk,
    HighRisk,
}

impl fmt::Display for HealthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthTier::OnTrack => write!(f, "On Track"),
            HealthTier::AtRisk => write!(f, "At Risk"),
            HealthTier::HighRisk => write!(f, "High Risk"),
        }
    }
}

/// Tunable thresholds; defaults are the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_at_risk_gap")]
    pub at_risk_gap: i32,

    #[serde(default = "default_high_risk_gap")]
    pub high_risk_gap: i32,

    #[serde(default = "default_stale_report_days")]
    pub stale_report_days: i64,

    #[serde(default = "default_stale_penalty")]
    pub stale_penalty: i32,

    #[serde(default = "default_stale_min_expected")]
    pub stale_min_expected: i32,

    #[serde(default = "default_in_progress_proxy")]
    pub in_progress_proxy: i32,

    #[serde(default = "default_blocked_proxy")]
    pub blocked_proxy: i32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            at_risk_gap: AT_RISK_GAP,
            high_risk_gap: HIGH_RISK_GAP,
            stale_report_days: STALE_REPORT_DAYS,
            stale_penalty: STALE_PENALTY,
            stale_min_expected: STALE_MIN_EXPECTED,
            in_progress_proxy: IN_PROGRESS_PROXY,
            blocked_proxy: BLOCKED_PROXY,
        }
    }
}

// Serde default functions
fn default_at_risk_gap() -> i32 {
    AT_RISK_GAP
}

fn default_high_risk_gap() -> i32 {
    HIGH_RISK_GAP
}

fn default_stale_report_days() -> i64 {
    STALE_REPORT_DAYS
}

fn default_stale_penalty() -> i32 {
    STALE_PENALTY
}

fn default_stale_min_expected() -> i32 {
    STALE_MIN_EXPECTED
}

fn default_in_progress_proxy() -> i32 {
    IN_PROGRESS_PROXY
}

fn default_blocked_proxy() -> i32 {
    BLOCKED_PROXY
}

impl HealthConfig {
    /// Compare `actual` against `expected` using the configured gaps.
    pub fn classify(&self, actual: i32, expected: i32) -> HealthTier {
        if actual < expected - self.high_risk_gap {
            HealthTier::HighRisk
        } else if actual < expected - self.at_risk_gap {
            HealthTier::AtRisk
        } else {
            HealthTier::OnTrack
        }
    }
}

/// 00:00:00 UTC on `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Percentage of `[start, end]` elapsed at `now`, rounded and clamped to 0–100.
///
/// A zero-length (or inverted) window has no meaningful ratio: it reads as
/// 100 once `now` reaches the end and 0 before that.
pub fn expected_progress(start: NaiveDate, end: NaiveDate, now: DateTime<Utc>) -> i32 {
    let start = start_of_day(start);
    let end = start_of_day(end);
    let total = (end - start).num_milliseconds();
    if total <= 0 {
        return if now >= end { 100 } else { 0 };
    }
    let elapsed = (now - start).num_milliseconds();
    let ratio = elapsed as f64 / total as f64 * 100.0;
    ratio.round().clamp(0.0, 100.0) as i32
}

pub fn evaluate_goal_health(goal: &Goal, now: DateTime<Utc>) -> HealthTier {
    evaluate_goal_health_with(goal, now, &HealthConfig::default())
}

pub fn evaluate_goal_health_with(goal: &Goal, now: DateTime<Utc>, config: &HealthConfig) -> HealthTier {
    let expected = expected_progress(goal.start_date, goal.time_bound, now);
    config.classify(i32::from(goal.progress), expected)
}

/// Health of an action plan. `reports` may include other plans' reports;
/// only those for `plan` are considered.
pub fn evaluate_action_plan_health(
    plan: &ActionPlan,
    reports: &[WeeklyReport],
    now: DateTime<Utc>,
) -> HealthTier {
    evaluate_action_plan_health_with(plan, reports, now, &HealthConfig::default())
}

pub fn evaluate_action_plan_health_with(
    plan: &ActionPlan,
    reports: &[WeeklyReport],
    now: DateTime<Utc>,
    config: &HealthConfig,
) -> HealthTier {
    if plan.status == ActionPlanStatus::Completed {
        return HealthTier::OnTrack;
    }
    if start_of_day(plan.end_date) < now {
        return HealthTier::HighRisk;
    }

    let expected = expected_progress(plan.start_date, plan.end_date, now);
    let status_progress = match plan.status {
        ActionPlanStatus::InProgress => config.in_progress_proxy,
        ActionPlanStatus::Blocked => config.blocked_proxy,
        ActionPlanStatus::NotStarted | ActionPlanStatus::Completed => NOT_STARTED_PROXY,
    };

    let stale = plan
        .last_report_date(reports)
        .map(|last| (now - start_of_day(last)).num_days())
        .is_some_and(|days| days > config.stale_report_days);
    let penalty = if stale && expected > config.stale_min_expected {
        config.stale_penalty
    } else {
        0
    };
    let effective = (status_progress - penalty).max(0);

    config.classify(effective, expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_plan::ActionPlanDraft;
    use crate::goal::GoalDraft;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn goal_fixture(progress: u8) -> Goal {
        let mut goal = Goal::new(
            GoalDraft {
                name: "Cloud certification".to_string(),
                start_date: Some(date(2025, 1, 1)),
                time_bound: Some(date(2025, 12, 31)),
                ..GoalDraft::default()
            },
            "u1",
            at(2025, 1, 1),
        )
        .unwrap();
        goal.progress = progress;
        goal
    }

    fn plan_fixture(status: ActionPlanStatus, start: NaiveDate, end: NaiveDate) -> ActionPlan {
        let mut plan = ActionPlan::new(
            Uuid::new_v4(),
            "u1",
            ActionPlanDraft {
                activity: "Study".to_string(),
                start_date: start,
                end_date: end,
                resources: String::new(),
                expected_outcome: String::new(),
            },
            start_of_day(start),
        )
        .unwrap();
        plan.status = status;
        plan
    }

    fn report_on(plan: &ActionPlan, day: NaiveDate) -> WeeklyReport {
        WeeklyReport {
            id: Uuid::new_v4(),
            goal_id: Some(plan.goal_id),
            action_plan_id: plan.id,
            date: day,
            summary: "weekly".to_string(),
            work_done: String::new(),
            blockers_challenges: String::new(),
            next_week_plan: String::new(),
            lead_feedback: None,
            created_at: None,
        }
    }

    #[test]
    fn half_elapsed_with_ten_percent_is_high_risk() {
        let goal = goal_fixture(10);
        assert_eq!(expected_progress(goal.start_date, goal.time_bound, at(2025, 7, 1)), 50);
        assert_eq!(evaluate_goal_health(&goal, at(2025, 7, 1)), HealthTier::HighRisk);
    }

    #[test]
    fn goal_tiers_follow_gaps() {
        let now = at(2025, 7, 1);
        assert_eq!(evaluate_goal_health(&goal_fixture(35), now), HealthTier::AtRisk);
        assert_eq!(evaluate_goal_health(&goal_fixture(40), now), HealthTier::OnTrack);
        assert_eq!(evaluate_goal_health(&goal_fixture(29), now), HealthTier::HighRisk);
    }

    #[test]
    fn expected_progress_is_clamped() {
        let (s, e) = (date(2025, 1, 1), date(2025, 12, 31));
        assert_eq!(expected_progress(s, e, at(2024, 6, 1)), 0);
        assert_eq!(expected_progress(s, e, at(2026, 6, 1)), 100);
    }

    #[test]
    fn zero_length_window_is_guarded() {
        let d = date(2025, 5, 5);
        assert_eq!(expected_progress(d, d, at(2025, 5, 4)), 0);
        assert_eq!(expected_progress(d, d, at(2025, 5, 5)), 100);
        assert_eq!(expected_progress(d, d, at(2025, 5, 6)), 100);
    }

    #[test]
    fn past_due_plan_is_high_risk() {
        let plan = plan_fixture(ActionPlanStatus::InProgress, date(2025, 1, 1), date(2025, 2, 1));
        let reports = vec![report_on(&plan, date(2025, 2, 28))];
        assert_eq!(
            evaluate_action_plan_health(&plan, &reports, at(2025, 3, 1)),
            HealthTier::HighRisk
        );
    }

    #[test]
    fn completed_plan_is_on_track_even_when_past_due() {
        let plan = plan_fixture(ActionPlanStatus::Completed, date(2025, 1, 1), date(2025, 2, 1));
        assert_eq!(
            evaluate_action_plan_health(&plan, &[], at(2025, 6, 1)),
            HealthTier::OnTrack
        );
    }

    #[test]
    fn in_progress_plan_uses_status_proxy() {
        // 30 of 100 days elapsed: expected 30, proxy 50.
        let plan = plan_fixture(ActionPlanStatus::InProgress, date(2025, 1, 1), date(2025, 4, 11));
        assert_eq!(
            evaluate_action_plan_health(&plan, &[], at(2025, 1, 31)),
            HealthTier::OnTrack
        );
        // 80 of 100 days elapsed: expected 80, proxy 50 → gap 30.
        assert_eq!(
            evaluate_action_plan_health(&plan, &[], at(2025, 3, 22)),
            HealthTier::HighRisk
        );
    }

    #[test]
    fn blocked_and_not_started_plans() {
        let plan = plan_fixture(ActionPlanStatus::Blocked, date(2025, 1, 1), date(2025, 4, 11));
        // expected 40 vs proxy 20 → gap 20 → At Risk (not strictly greater than 20).
        assert_eq!(
            evaluate_action_plan_health(&plan, &[], at(2025, 2, 10)),
            HealthTier::AtRisk
        );
        let plan = plan_fixture(ActionPlanStatus::NotStarted, date(2025, 1, 1), date(2025, 4, 11));
        assert_eq!(
            evaluate_action_plan_health(&plan, &[], at(2025, 1, 6)),
            HealthTier::OnTrack
        );
    }

    #[test]
    fn stale_reports_reduce_the_proxy() {
        // expected 35 at day 35; proxy 50 → On Track when fresh.
        let plan = plan_fixture(ActionPlanStatus::InProgress, date(2025, 1, 1), date(2025, 4, 11));
        let now = at(2025, 2, 5);
        let fresh = vec![report_on(&plan, date(2025, 2, 1))];
        assert_eq!(evaluate_action_plan_health(&plan, &fresh, now), HealthTier::OnTrack);

        // Stale: 50 − 10 = 40 vs expected 35 → still On Track.
        let stale = vec![report_on(&plan, date(2025, 1, 10))];
        assert_eq!(evaluate_action_plan_health(&plan, &stale, now), HealthTier::OnTrack);

        // At day 65 (expected 65): fresh 50 → At Risk, stale 40 → High Risk.
        let later = at(2025, 3, 7);
        let fresh = vec![report_on(&plan, date(2025, 3, 1))];
        assert_eq!(evaluate_action_plan_health(&plan, &fresh, later), HealthTier::AtRisk);
        let stale = vec![report_on(&plan, date(2025, 2, 1))];
        assert_eq!(evaluate_action_plan_health(&plan, &stale, later), HealthTier::HighRisk);
    }

    #[test]
    fn other_plans_reports_are_ignored() {
        let plan = plan_fixture(ActionPlanStatus::InProgress, date(2025, 1, 1), date(2025, 4, 11));
        let other = plan_fixture(ActionPlanStatus::InProgress, date(2025, 1, 1), date(2025, 4, 11));
        let reports = vec![report_on(&other, date(2025, 1, 2))];
        assert_eq!(plan.last_report_date(&reports), None);
        assert_eq!(
            evaluate_action_plan_health(&plan, &reports, at(2025, 3, 7)),
            HealthTier::AtRisk
        );
    }

    #[test]
    fn config_overrides_thresholds() {
        let config: HealthConfig = toml::from_str("at_risk_gap = 5\nhigh_risk_gap = 50").unwrap();
        assert_eq!(config.stale_report_days, STALE_REPORT_DAYS);
        let goal = goal_fixture(10);
        assert_eq!(
            evaluate_goal_health_with(&goal, at(2025, 7, 1), &config),
            HealthTier::AtRisk
        );
    }

    #[test]
    fn tier_labels() {
        assert_eq!(HealthTier::HighRisk.to_string(), "High Risk");
        assert_eq!(serde_json::to_string(&HealthTier::OnTrack).unwrap(), "\"on_track\"");
    }
}
