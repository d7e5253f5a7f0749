// review_flow.rs — End-to-end review workflow for a goal and its action plan.
//
//   1. Member creates a goal and an action plan
//   2. Member submits the goal; leader rejects; member revises and resubmits
//   3. Leader approves; goal starts and stays locked (progress-only edits)
//   4. Member moves the plan deadline three times; the fourth attempt fails
//   5. Health reflects the plan's final state

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use idp_goal::{
    apply_action_plan_transition, apply_goal_transition, evaluate_action_plan_health, Actor,
    ActionPlan, ActionPlanCommand, ActionPlanDraft, ActionPlanStatus, EditScope, Goal, GoalCommand,
    GoalDraft, GoalDuration, GoalEdit, GoalError, GoalStatus, HealthTier, ReviewDecision,
    ReviewState, ReviewStatus, Reviewable, WeeklyReport, WeeklyReportDraft,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

#[test]
fn goal_and_plan_review_lifecycle() {
    let member = Actor::member("member-7");
    let leader = Actor::leader("leader-2");

    // =========================================================
    // 1. Authoring
    // =========================================================
    let goal = Goal::new(
        GoalDraft {
            name: "Own the billing service on-call".to_string(),
            start_date: Some(date(2025, 4, 1)),
            duration_type: Some(GoalDuration::HalfYear),
            weight: 25,
            ..GoalDraft::default()
        },
        member.id.clone(),
        at(2025, 3, 28),
    )
    .unwrap();
    assert_eq!(goal.time_bound, date(2025, 9, 30));
    assert_eq!(goal.edit_scope(), EditScope::Full);

    let plan = ActionPlan::new(
        goal.id,
        member.id.clone(),
        ActionPlanDraft {
            activity: "Shadow two on-call rotations".to_string(),
            start_date: date(2025, 4, 1),
            end_date: date(2025, 5, 31),
            resources: "runbooks".to_string(),
            expected_outcome: "solo rotation".to_string(),
        },
        at(2025, 3, 28),
    )
    .unwrap();

    // =========================================================
    // 2. Reject and resubmit
    // =========================================================
    let goal = apply_goal_transition(&goal, &GoalCommand::RequestReview, &member, at(2025, 3, 29)).unwrap();
    let goal = apply_goal_transition(
        &goal,
        &GoalCommand::LeaderReview(ReviewDecision::reject("add a measurable outcome")),
        &leader,
        at(2025, 3, 30),
    )
    .unwrap();
    assert_eq!(goal.review.state(), Some(ReviewState::RejectedUnlocked));

    let revise = GoalEdit {
        measurable: Some("zero escalations in solo week".to_string()),
        ..GoalEdit::default()
    };
    let goal = apply_goal_transition(&goal, &GoalCommand::Edit(revise), &member, at(2025, 3, 30)).unwrap();
    let goal = apply_goal_transition(&goal, &GoalCommand::RequestReview, &member, at(2025, 3, 31)).unwrap();

    // =========================================================
    // 3. Approve
    // =========================================================
    let goal = apply_goal_transition(
        &goal,
        &GoalCommand::LeaderReview(ReviewDecision::approve()),
        &leader,
        at(2025, 4, 1),
    )
    .unwrap();
    assert_eq!(goal.status, GoalStatus::InProgress);
    assert!(goal.review.is_locked);
    assert_eq!(goal.review.review_status, Some(ReviewStatus::Approved));
    assert_eq!(goal.edit_scope(), EditScope::ProgressOnly);
    let goal =
        apply_goal_transition(&goal, &GoalCommand::Edit(GoalEdit::progress(20)), &member, at(2025, 4, 20))
            .unwrap();
    assert_eq!(goal.progress, 20);

    // =========================================================
    // 4. Deadline changes, capped at three
    // =========================================================
    let mut plan = apply_action_plan_transition(
        &plan,
        &ActionPlanCommand::Edit(idp_goal::ActionPlanEdit {
            status: Some(ActionPlanStatus::InProgress),
            ..Default::default()
        }),
        &member,
        at(2025, 4, 2),
    )
    .unwrap();

    for (i, new_end) in [date(2025, 6, 15), date(2025, 6, 30), date(2025, 7, 15)]
        .into_iter()
        .enumerate()
    {
        plan = apply_action_plan_transition(
            &plan,
            &ActionPlanCommand::ProposeDeadline { new_date: new_end },
            &member,
            at(2025, 5, 1),
        )
        .unwrap();
        assert_eq!(plan.deadline_change_count as usize, i + 1);
        plan = apply_action_plan_transition(
            &plan,
            &ActionPlanCommand::LeaderReview(ReviewDecision::approve()),
            &leader,
            at(2025, 5, 2),
        )
        .unwrap();
        assert_eq!(plan.end_date, new_end);
    }

    let err = apply_action_plan_transition(
        &plan,
        &ActionPlanCommand::ProposeDeadline {
            new_date: date(2025, 8, 1),
        },
        &member,
        at(2025, 7, 1),
    )
    .unwrap_err();
    assert!(matches!(err, GoalError::DeadlineChangeLimitExceeded { .. }));
    assert_eq!(plan.deadline_change_count, 3);

    // =========================================================
    // 5. Health
    // =========================================================
    let report = WeeklyReport::new(
        &plan,
        WeeklyReportDraft {
            date: date(2025, 5, 5),
            summary: "Shadowed first rotation".to_string(),
            work_done: "2 incidents".to_string(),
            blockers_challenges: "pager noise".to_string(),
            next_week_plan: "second rotation".to_string(),
        },
        &member,
        at(2025, 5, 5),
    )
    .unwrap();
    assert_eq!(
        evaluate_action_plan_health(&plan, &[report], at(2025, 7, 20)),
        HealthTier::HighRisk
    );
}
