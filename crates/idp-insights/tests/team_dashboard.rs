// team_dashboard.rs — A manager's view over two teams for one week.
//
//   1. Build a snapshot: three members, two teams, reports, a pending
//      deadline proposal, a pending verification, and progress history
//   2. Compute the org-wide bundle and check lists, rollups and trends
//   3. Narrow to one team and to one member

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use idp_goal::{
    Actor, ActionPlan, ActionPlanDraft, ActionPlanStatus, Goal, GoalDraft, GoalStatus, ReviewStatus,
    WeeklyReport,
};
use idp_insights::{
    compute_insights_with, InsightContext, InsightWindow, Member, ProgressLog, ReportStats,
};
use idp_verify::{Submission, VerificationRequest};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// Wednesday of the week 2025-06-02 ..= 2025-06-08.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap()
}

fn goal(owner: &str, progress: u8) -> Goal {
    let mut goal = Goal::new(
        GoalDraft {
            name: format!("{owner}'s growth goal"),
            start_date: Some(date(2025, 1, 1)),
            time_bound: Some(date(2025, 12, 31)),
            progress,
            ..GoalDraft::default()
        },
        owner,
        now(),
    )
    .unwrap();
    goal.status = GoalStatus::InProgress;
    goal
}

fn plan(goal: &Goal, status: ActionPlanStatus) -> ActionPlan {
    let mut plan = ActionPlan::new(
        goal.id,
        goal.user_id.clone(),
        ActionPlanDraft {
            activity: "Weekly practice".to_string(),
            start_date: date(2025, 5, 1),
            end_date: date(2025, 8, 31),
            resources: String::new(),
            expected_outcome: String::new(),
        },
        now(),
    )
    .unwrap();
    plan.status = status;
    plan
}

fn report(plan: &ActionPlan, on: NaiveDate) -> WeeklyReport {
    serde_json::from_value(serde_json::json!({
        "id": Uuid::new_v4(),
        "action_plan_id": plan.id,
        "date": on,
        "summary": "kept going",
        "blockers_challenges": "waiting on access",
    }))
    .unwrap()
}

#[test]
fn manager_dashboard_for_two_teams() {
    // =========================================================
    // 1. Snapshot
    // =========================================================
    let members = vec![
        Member::new("alice")
            .named("Alice")
            .with_email("alice@example.org")
            .in_team("platform"),
        Member::new("bob").named("Bob").in_team("platform"),
        Member::new("carol").named("Carol").in_team("data"),
    ];

    let mut alice = goal("alice", 60);
    alice.review.is_locked = true;
    alice.review.review_status = Some(ReviewStatus::Approved);
    let mut practice = plan(&alice, ActionPlanStatus::InProgress);
    practice.weekly_reports = vec![report(&practice, date(2025, 6, 2)), report(&practice, date(2025, 5, 26))];
    let mut shipped = plan(&alice, ActionPlanStatus::Completed);
    shipped.evidence_link = Some("https://git.example/alice/demo".to_string());
    alice.action_plans = vec![practice, shipped];

    let mut bob = goal("bob", 20);
    let silent = plan(&bob, ActionPlanStatus::InProgress);
    let mut extended = plan(&bob, ActionPlanStatus::InProgress);
    extended
        .propose_deadline(date(2025, 9, 30), &Actor::member("bob"))
        .unwrap();
    let extended_id = extended.id;
    bob.action_plans = vec![silent, extended];

    let mut carol = goal("carol", 30);
    let offline = plan(&carol, ActionPlanStatus::InProgress);
    let mut stats = HashMap::new();
    stats.insert(
        offline.id,
        ReportStats {
            last_report_date: Some(date(2025, 5, 14)),
            has_report_in_range: false,
            report_dates: vec![],
        },
    );
    carol.action_plans = vec![offline];

    let mut history = ProgressLog::new();
    history.record(alice.id, 50, Utc.with_ymd_and_hms(2025, 5, 25, 0, 0, 0).unwrap());
    history.record(carol.id, 10, Utc.with_ymd_and_hms(2025, 5, 20, 0, 0, 0).unwrap());

    let verification = VerificationRequest::submit(
        &alice,
        Submission {
            scope: "Terraform modules".to_string(),
            ..Submission::default()
        },
        &Actor::member("alice"),
        &[],
        now(),
    )
    .unwrap();
    let verifications = vec![verification];

    let goals = vec![alice, bob, carol];
    let ctx = InsightContext::default()
        .with_members(&members)
        .with_history(&history)
        .with_verifications(&verifications);

    // =========================================================
    // 2. Org-wide
    // =========================================================
    let bundle = compute_insights_with(&goals, &stats, &InsightWindow::new(now(), 2025), &ctx);

    assert!(bundle.skipped.is_empty());
    assert_eq!(bundle.window.from, date(2025, 4, 14));
    assert_eq!(bundle.window.to, date(2025, 6, 8));
    assert_eq!(bundle.missing_reports.len(), 3);
    assert_eq!(bundle.pending_deadline_requests.len(), 1);
    assert_eq!(bundle.pending_deadline_requests[0].action_plan_id, extended_id);
    assert_eq!(bundle.pending_deadline_requests[0].requested_end_date, date(2025, 9, 30));

    let a = bundle.member("alice").unwrap();
    assert_eq!(a.weekly_reports.streak_weeks, 2);
    assert_eq!(a.weekly_reports.weeks_with_activity, 2);
    assert_eq!(a.weekly_reports.top_blockers[0].count, 2);
    assert_eq!(a.action_plans.evidence_rate, 1.0);
    assert_eq!(a.goals.approved, 1);
    assert_eq!(a.goals.health.on_track, 1);
    assert_eq!(a.verifications.pending, 1);
    assert_eq!(a.progress_delta, Some(10.0));
    assert_eq!(a.email.as_deref(), Some("alice@example.org"));
    assert_eq!(a.reports_by_week, vec![0, 0, 0, 0, 0, 0, 1, 1]);

    let b = bundle.member("bob").unwrap();
    assert_eq!(b.goals.pending, 1);
    assert_eq!(b.goals.health.high_risk, 1);
    assert_eq!(b.goals.health.stagnant, 1);
    assert_eq!(b.progress_delta, None);
    assert!(b.email.is_none());
    assert_eq!(b.reports_by_week, vec![0; 8]);

    let c = bundle.member("carol").unwrap();
    assert_eq!(c.goals.health.at_risk, 1);
    assert_eq!(c.goals.health.stagnant, 0);
    assert_eq!(c.weekly_reports.streak_weeks, 0);

    let team_ids: Vec<&str> = bundle.teams.iter().map(|t| t.team_id.as_str()).collect();
    assert_eq!(team_ids, vec!["platform", "data"]);
    let platform = bundle.team("platform").unwrap();
    assert_eq!(platform.member_count, 2);
    assert_eq!(platform.active_members, 1);
    assert_eq!(platform.progress_delta, Some(10.0));
    let platform_top: Vec<&str> = platform
        .leaderboards
        .top_streak
        .iter()
        .map(|e| e.user_id.as_str())
        .collect();
    assert_eq!(platform_top, vec!["alice", "bob"]);
    assert_eq!(platform.leaderboards.top_evidence_rate.len(), 1);
    let data = bundle.team("data").unwrap();
    assert_eq!(data.leaderboards.top_progress_delta.len(), 1);
    assert_eq!(data.leaderboards.top_progress_delta[0].user_id, "carol");

    assert_eq!(bundle.totals.members, 3);
    assert_eq!(bundle.totals.progress_delta, Some(15.0));

    let this_week = bundle.trends.last().unwrap();
    assert_eq!(this_week.week, date(2025, 6, 2));
    assert_eq!(this_week.active_members, 1);
    assert_eq!(this_week.active_rate, 0.33);
    assert_eq!(bundle.trends.len(), 8);

    let top: Vec<&str> = bundle
        .leaderboards
        .top_progress_delta
        .iter()
        .map(|e| e.user_id.as_str())
        .collect();
    assert_eq!(top, vec!["carol", "alice"]);
    assert_eq!(bundle.leaderboards.top_streak[0].user_id, "alice");
    assert_eq!(bundle.leaderboards.bottom_streak[0].user_id, "bob");

    // =========================================================
    // 3. Narrowed scopes
    // =========================================================
    let team_only = compute_insights_with(
        &goals,
        &stats,
        &InsightWindow::new(now(), 2025).team("platform"),
        &ctx,
    );
    assert_eq!(team_only.members.len(), 2);
    assert!(team_only.member("carol").is_none());
    assert_eq!(team_only.missing_reports.len(), 2);

    let one = compute_insights_with(
        &goals,
        &stats,
        &InsightWindow::new(now(), 2025).user("carol").weeks(3),
        &ctx,
    );
    assert_eq!(one.members.len(), 1);
    assert_eq!(one.window.weeks, 3);
    // 2025-05-14 falls outside a three-week window.
    assert_eq!(one.members[0].weekly_reports.reports_in_window, 0);
    assert_eq!(one.members[0].goals.health.stagnant, 1);

    let other_year = compute_insights_with(&goals, &stats, &InsightWindow::new(now(), 2024), &ctx);
    assert_eq!(other_year.totals.goals.total, 0);
}
