// insights.rs — The aggregation pass behind leader and manager dashboards.
//
// One pass over an in-memory snapshot: scope the goals, validate each
// entity, index report dates per action plan, then derive the lists, the
// per-member and per-team rollups, weekly trends and leaderboards.
// Invalid entities are recorded in `skipped` and never abort the pass.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use idp_goal::{
    evaluate_goal_health_with, ActionPlan, ActionPlanStatus, Goal, GoalStatus, HealthConfig,
    HealthTier, ReviewStatus,
};
use idp_verify::{VerificationRequest, VerificationStatus};

use crate::bundle::{
    BlockerCount, DeadlineRequest, GoalSummary, HealthCounts, InsightBundle, LeaderboardEntry,
    Leaderboards, MemberSummary, MissingReport, OverdueGoal, OverduePlan, PlanSummary,
    ReportSummary, ScopeSummary, SkippedEntity, TeamSummary, VerificationCounts, WeekTrend,
};
use crate::config::PROGRESS_DELTA_DAYS;
use crate::history::ProgressHistory;
use crate::scope::{InsightContext, InsightWindow, Member, ReportStats};
use crate::week::{streak_weeks, trailing_weeks, Week, WindowRange};

/// Aggregate `goals` (with nested action plans and any loaded weekly
/// reports) for `window`. `report_stats` covers plans whose reports are not
/// loaded inline.
pub fn compute_insights(
    goals: &[Goal],
    report_stats: &HashMap<Uuid, ReportStats>,
    window: &InsightWindow,
) -> InsightBundle {
    compute_insights_with(goals, report_stats, window, &InsightContext::default())
}

/// Like [`compute_insights`], with a member directory, progress history,
/// verification requests and tuned thresholds.
pub fn compute_insights_with(
    goals: &[Goal],
    report_stats: &HashMap<Uuid, ReportStats>,
    window: &InsightWindow,
    ctx: &InsightContext<'_>,
) -> InsightBundle {
    let pass = Pass::new(window, ctx);

    let mut skipped = Vec::new();
    let mut scoped_goals: Vec<&Goal> = Vec::new();
    let mut plans: Vec<PlanView<'_>> = Vec::new();

    for goal in goals {
        if goal.year != window.year || !pass.in_scope(&goal.user_id) {
            continue;
        }
        if let Err(err) = goal.validate() {
            skip(&mut skipped, "goal", goal.id, err.to_string());
            continue;
        }
        scoped_goals.push(goal);

        for plan in &goal.action_plans {
            if plan.goal_id != goal.id {
                skip(
                    &mut skipped,
                    "action_plan",
                    plan.id,
                    format!("nested under goal {} but belongs to goal {}", goal.id, plan.goal_id),
                );
                continue;
            }
            if let Err(err) = plan.validate() {
                skip(&mut skipped, "action_plan", plan.id, err.to_string());
                continue;
            }
            plans.push(PlanView::build(
                goal,
                plan,
                report_stats.get(&plan.id),
                &pass,
                &mut skipped,
            ));
        }
    }

    let roster = pass.roster(&scoped_goals);
    let today = pass.today;

    let overdue_goals = scoped_goals
        .iter()
        .filter(|g| g.is_overdue(today))
        .map(|g| OverdueGoal {
            goal_id: g.id,
            user_id: g.user_id.clone(),
            name: g.name.clone(),
            time_bound: g.time_bound,
            days_overdue: (today - g.time_bound).num_days(),
        })
        .collect();

    let overdue_action_plans = plans
        .iter()
        .filter(|p| p.plan.is_overdue(today))
        .map(|p| OverduePlan {
            action_plan_id: p.plan.id,
            goal_id: p.goal.id,
            owner_id: p.plan.owner_id.clone(),
            activity: p.plan.activity.clone(),
            end_date: p.plan.end_date,
            days_overdue: (today - p.plan.end_date).num_days(),
        })
        .collect();

    let missing_reports = plans
        .iter()
        .filter(|p| p.expects_report(pass.current) && !p.reported_in(pass.current))
        .map(|p| MissingReport {
            action_plan_id: p.plan.id,
            goal_id: p.goal.id,
            owner_id: p.plan.owner_id.clone(),
            activity: p.plan.activity.clone(),
            last_report_date: p.last_report_date,
        })
        .collect();

    let pending_deadline_requests = plans
        .iter()
        .filter(|p| p.plan.has_pending_deadline_request())
        .filter_map(|p| {
            p.plan.request_deadline_date.map(|requested| DeadlineRequest {
                action_plan_id: p.plan.id,
                goal_id: p.goal.id,
                owner_id: p.plan.owner_id.clone(),
                current_end_date: p.plan.end_date,
                requested_end_date: requested,
                changes_used: p.plan.deadline_change_count,
            })
        })
        .collect();

    let members: Vec<MemberSummary> = roster
        .iter()
        .map(|m| pass.member_summary(m, &scoped_goals, &plans))
        .collect();

    let teams = pass.team_summaries(&roster, &members, &scoped_goals, &plans);

    let all_plans: Vec<&PlanView<'_>> = plans.iter().collect();
    let totals = ScopeSummary {
        members: roster.len(),
        goals: pass.goal_summary(&scoped_goals, &all_plans),
        action_plans: pass.plan_summary(&all_plans),
        reports_in_window: all_plans.iter().map(|p| p.reports_in(&pass.range)).sum(),
        progress_delta: pass.progress_delta(&scoped_goals),
    };

    let trends = pass.trends(&roster, &plans);
    let leaderboards = leaderboards(&members, ctx.config.top_n);

    tracing::info!(
        year = window.year,
        team = ?window.team_id,
        user = ?window.user_id,
        members = roster.len(),
        goals = scoped_goals.len(),
        action_plans = plans.len(),
        skipped = skipped.len(),
        "insights computed"
    );

    InsightBundle {
        year: window.year,
        team_id: window.team_id.clone(),
        user_id: window.user_id.clone(),
        window: pass.range,
        overdue_goals,
        overdue_action_plans,
        missing_reports,
        pending_deadline_requests,
        totals,
        members,
        teams,
        trends,
        leaderboards,
        skipped,
    }
}

fn skip(skipped: &mut Vec<SkippedEntity>, kind: &str, id: Uuid, reason: String) {
    tracing::warn!(kind, %id, reason = %reason, "skipping invalid entity");
    skipped.push(SkippedEntity {
        kind: kind.to_string(),
        id,
        reason,
    });
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64)
    }
}

/// One action plan with its report activity resolved.
struct PlanView<'a> {
    goal: &'a Goal,
    plan: &'a ActionPlan,
    dates: Vec<NaiveDate>,
    blockers: Vec<&'a str>,
    last_report_date: Option<NaiveDate>,
}

impl<'a> PlanView<'a> {
    fn build(
        goal: &'a Goal,
        plan: &'a ActionPlan,
        stats: Option<&ReportStats>,
        pass: &Pass<'_>,
        skipped: &mut Vec<SkippedEntity>,
    ) -> Self {
        let mut dates = Vec::new();
        let mut blockers = Vec::new();

        if plan.weekly_reports.is_empty() {
            if let Some(stats) = stats {
                dates.extend(stats.report_dates.iter().copied());
                if let Some(last) = stats.last_report_date {
                    if !dates.contains(&last) {
                        dates.push(last);
                    }
                }
                // A presence flag without dates counts as one report this week.
                if stats.has_report_in_range && !dates.iter().any(|d| pass.current.contains(*d)) {
                    dates.push(pass.current.start);
                }
            }
        } else {
            for report in &plan.weekly_reports {
                if report.action_plan_id != plan.id {
                    skip(
                        skipped,
                        "weekly_report",
                        report.id,
                        format!("nested under action plan {} but belongs to {}", plan.id, report.action_plan_id),
                    );
                    continue;
                }
                dates.push(report.date);
                if pass.range.contains(report.date) {
                    if let Some(text) = report.blocker() {
                        blockers.push(text);
                    }
                }
            }
        }

        let last_report_date = dates.iter().copied().max();
        Self {
            goal,
            plan,
            dates,
            blockers,
            last_report_date,
        }
    }

    /// The plan is live this week and should have reported.
    fn expects_report(&self, current: Week) -> bool {
        self.goal.status == GoalStatus::InProgress
            && self.plan.status.is_active()
            && self.plan.start_date <= current.end
    }

    fn reported_in(&self, week: Week) -> bool {
        self.dates.iter().any(|d| week.contains(*d))
    }

    fn reports_on(&self, week: Week) -> usize {
        self.dates.iter().filter(|d| week.contains(**d)).count()
    }

    fn reports_in(&self, range: &WindowRange) -> usize {
        self.dates.iter().filter(|d| range.contains(**d)).count()
    }
}

/// Values shared by every step of one aggregation pass.
struct Pass<'a> {
    window: &'a InsightWindow,
    ctx: &'a InsightContext<'a>,
    directory: HashMap<&'a str, &'a Member>,
    now: DateTime<Utc>,
    today: NaiveDate,
    current: Week,
    range: WindowRange,
    weeks: Vec<Week>,
}

impl<'a> Pass<'a> {
    fn new(window: &'a InsightWindow, ctx: &'a InsightContext<'a>) -> Self {
        let range = window.range();
        Self {
            window,
            ctx,
            directory: ctx.members.iter().map(|m| (m.user_id.as_str(), m)).collect(),
            now: window.now,
            today: window.now.date_naive(),
            current: Week::current(window.now),
            weeks: trailing_weeks(window.now, range.weeks),
            range,
        }
    }

    fn health(&self) -> &HealthConfig {
        &self.ctx.health
    }

    fn in_scope(&self, user_id: &str) -> bool {
        if let Some(user) = &self.window.user_id {
            if user != user_id {
                return false;
            }
        }
        match &self.window.team_id {
            Some(team) => {
                self.directory
                    .get(user_id)
                    .and_then(|m| m.team_id.as_deref())
                    == Some(team.as_str())
            }
            None => true,
        }
    }

    /// Directory members in scope, in directory order, followed by goal
    /// owners missing from the directory.
    fn roster(&self, goals: &[&Goal]) -> Vec<Member> {
        let mut roster: Vec<Member> = self
            .ctx
            .members
            .iter()
            .filter(|m| self.in_scope(&m.user_id))
            .cloned()
            .collect();
        for goal in goals {
            if !roster.iter().any(|m| m.user_id == goal.user_id) {
                roster.push(Member::new(goal.user_id.clone()));
            }
        }
        if let Some(user) = &self.window.user_id {
            if roster.is_empty() && self.in_scope(user) {
                roster.push(Member::new(user.clone()));
            }
        }
        roster
    }

    fn goal_summary(&self, goals: &[&Goal], plans: &[&PlanView<'_>]) -> GoalSummary {
        let mut summary = GoalSummary {
            total: goals.len(),
            ..GoalSummary::default()
        };
        let mut health = HealthCounts::default();
        for goal in goals {
            match goal.review.review_status {
                Some(ReviewStatus::Approved) => summary.approved += 1,
                None | Some(ReviewStatus::Pending) => summary.pending += 1,
                Some(ReviewStatus::Rejected) | Some(ReviewStatus::Cancelled) => {}
            }
            match evaluate_goal_health_with(goal, self.now, self.health()) {
                HealthTier::OnTrack => health.on_track += 1,
                HealthTier::AtRisk => health.at_risk += 1,
                HealthTier::HighRisk => health.high_risk += 1,
            }
            let active_in_window = plans
                .iter()
                .any(|p| p.goal.id == goal.id && p.reports_in(&self.range) > 0);
            if goal.status == GoalStatus::InProgress && !active_in_window {
                health.stagnant += 1;
            }
        }
        summary.health = health;
        if !goals.is_empty() {
            let sum: u32 = goals.iter().map(|g| u32::from(g.progress)).sum();
            summary.progress_avg = round2(f64::from(sum) / goals.len() as f64);
        }
        summary
    }

    fn plan_summary(&self, plans: &[&PlanView<'_>]) -> PlanSummary {
        let completed: Vec<&&PlanView<'_>> = plans
            .iter()
            .filter(|p| p.plan.status == ActionPlanStatus::Completed)
            .collect();
        let completed_with_evidence = completed.iter().filter(|p| p.plan.has_evidence()).count();
        PlanSummary {
            total: plans.len(),
            overdue: plans.iter().filter(|p| p.plan.is_overdue(self.today)).count(),
            completed: completed.len(),
            completed_with_evidence,
            evidence_rate: ratio(completed_with_evidence, completed.len()),
        }
    }

    fn report_summary(&self, plans: &[&PlanView<'_>]) -> ReportSummary {
        let dates: Vec<NaiveDate> = plans.iter().flat_map(|p| p.dates.iter().copied()).collect();
        let weeks_with_activity = self
            .weeks
            .iter()
            .filter(|w| dates.iter().any(|d| w.contains(*d)))
            .count() as u32;
        ReportSummary {
            reports_in_window: plans.iter().map(|p| p.reports_in(&self.range)).sum(),
            weeks_with_activity,
            streak_weeks: streak_weeks(&dates, self.current, self.range.weeks),
            top_blockers: top_blockers(
                plans.iter().flat_map(|p| p.blockers.iter().copied()),
                self.ctx.config.top_blockers,
            ),
        }
    }

    /// Mean change in progress against the latest snapshot at least a week old.
    fn progress_delta(&self, goals: &[&Goal]) -> Option<f64> {
        let history: &dyn ProgressHistory = self.ctx.history?;
        let cutoff = self.now - Duration::days(PROGRESS_DELTA_DAYS);
        let deltas: Vec<i32> = goals
            .iter()
            .filter_map(|g| {
                history
                    .progress_at(g.id, cutoff)
                    .map(|prior| i32::from(g.progress) - i32::from(prior))
            })
            .collect();
        if deltas.is_empty() {
            return None;
        }
        let sum: i32 = deltas.iter().sum();
        Some(round2(f64::from(sum) / deltas.len() as f64))
    }

    fn verification_counts(&self, user_id: &str, goals: &[&Goal]) -> VerificationCounts {
        let requests: Vec<&VerificationRequest> = self
            .ctx
            .verifications
            .iter()
            .filter(|v| v.requester_id == user_id && goals.iter().any(|g| g.id == v.goal_id))
            .collect();
        VerificationCounts {
            pending: requests
                .iter()
                .filter(|v| v.status == VerificationStatus::Pending)
                .count(),
            reviewed: requests
                .iter()
                .filter(|v| v.status == VerificationStatus::Reviewed)
                .count(),
        }
    }

    fn member_summary(&self, member: &Member, goals: &[&Goal], plans: &[PlanView<'_>]) -> MemberSummary {
        let own_goals: Vec<&Goal> = goals
            .iter()
            .copied()
            .filter(|g| g.user_id == member.user_id)
            .collect();
        let own_plans: Vec<&PlanView<'_>> = plans
            .iter()
            .filter(|p| p.goal.user_id == member.user_id)
            .collect();
        MemberSummary {
            user_id: member.user_id.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            team_id: member.team_id.clone(),
            goals: self.goal_summary(&own_goals, &own_plans),
            action_plans: self.plan_summary(&own_plans),
            weekly_reports: self.report_summary(&own_plans),
            reports_by_week: self
                .weeks
                .iter()
                .map(|week| own_plans.iter().map(|p| p.reports_on(*week)).sum())
                .collect(),
            verifications: self.verification_counts(&member.user_id, &own_goals),
            progress_delta: self.progress_delta(&own_goals),
        }
    }

    fn team_summaries(
        &self,
        roster: &[Member],
        summaries: &[MemberSummary],
        goals: &[&Goal],
        plans: &[PlanView<'_>],
    ) -> Vec<TeamSummary> {
        let mut team_ids: Vec<&str> = Vec::new();
        for member in roster {
            if let Some(team) = member.team_id.as_deref() {
                if !team_ids.contains(&team) {
                    team_ids.push(team);
                }
            }
        }

        team_ids
            .into_iter()
            .map(|team_id| {
                let members: Vec<&Member> = roster
                    .iter()
                    .filter(|m| m.team_id.as_deref() == Some(team_id))
                    .collect();
                let in_team = |user_id: &str| members.iter().any(|m| m.user_id == user_id);
                let team_goals: Vec<&Goal> = goals.iter().copied().filter(|g| in_team(g.user_id.as_str())).collect();
                let team_plans: Vec<&PlanView<'_>> =
                    plans.iter().filter(|p| in_team(p.goal.user_id.as_str())).collect();
                let active_members = members
                    .iter()
                    .filter(|m| {
                        team_plans
                            .iter()
                            .any(|p| p.goal.user_id == m.user_id && p.reported_in(self.current))
                    })
                    .count();
                let team_summaries: Vec<MemberSummary> = summaries
                    .iter()
                    .filter(|s| s.team_id.as_deref() == Some(team_id))
                    .cloned()
                    .collect();
                TeamSummary {
                    team_id: team_id.to_string(),
                    team_name: members.iter().find_map(|m| m.team_name.clone()),
                    member_count: members.len(),
                    active_members,
                    goals: self.goal_summary(&team_goals, &team_plans),
                    action_plans: self.plan_summary(&team_plans),
                    reports_in_window: team_plans.iter().map(|p| p.reports_in(&self.range)).sum(),
                    progress_delta: self.progress_delta(&team_goals),
                    leaderboards: leaderboards(&team_summaries, self.ctx.config.top_n),
                }
            })
            .collect()
    }

    fn trends(&self, roster: &[Member], plans: &[PlanView<'_>]) -> Vec<WeekTrend> {
        self.weeks
            .iter()
            .map(|week| {
                let active_members = roster
                    .iter()
                    .filter(|m| {
                        plans
                            .iter()
                            .any(|p| p.goal.user_id == m.user_id && p.reported_in(*week))
                    })
                    .count();
                WeekTrend {
                    week: week.start,
                    active_members,
                    active_rate: ratio(active_members, roster.len()),
                    reports: plans.iter().map(|p| p.reports_on(*week)).sum(),
                }
            })
            .collect()
    }
}

/// Group blockers case-insensitively; the first spelling seen is kept.
fn top_blockers<'a>(blockers: impl Iterator<Item = &'a str>, limit: usize) -> Vec<BlockerCount> {
    let mut counts: Vec<(String, BlockerCount)> = Vec::new();
    for text in blockers {
        let key = text.to_lowercase();
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, entry)) => entry.count += 1,
            None => counts.push((
                key,
                BlockerCount {
                    text: text.to_string(),
                    count: 1,
                },
            )),
        }
    }
    let mut out: Vec<BlockerCount> = counts.into_iter().map(|(_, c)| c).collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out.truncate(limit);
    out
}

fn entry(member: &MemberSummary, value: f64) -> LeaderboardEntry {
    LeaderboardEntry {
        user_id: member.user_id.clone(),
        name: member.name.clone(),
        value,
    }
}

/// Rank `entries` by value; ties keep roster order.
fn rank(mut entries: Vec<LeaderboardEntry>, descending: bool, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| {
        let ord = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    entries.truncate(limit);
    entries
}

fn leaderboards(members: &[MemberSummary], limit: usize) -> Leaderboards {
    let streaks: Vec<LeaderboardEntry> = members
        .iter()
        .map(|m| entry(m, f64::from(m.weekly_reports.streak_weeks)))
        .collect();
    Leaderboards {
        top_streak: rank(streaks.clone(), true, limit),
        top_evidence_rate: rank(
            members
                .iter()
                .filter(|m| m.action_plans.completed > 0)
                .map(|m| entry(m, m.action_plans.evidence_rate))
                .collect(),
            true,
            limit,
        ),
        top_progress_delta: rank(
            members
                .iter()
                .filter_map(|m| m.progress_delta.map(|d| entry(m, d)))
                .collect(),
            true,
            limit,
        ),
        bottom_streak: rank(streaks, false, limit),
    }
}
