//! # idp-insights
//!
//! Read-only analytics for leader and manager dashboards.
//!
//! [`compute_insights`] takes a snapshot of goals (with nested action plans
//! and any loaded weekly reports), pre-fetched report presence per plan, and
//! an [`InsightWindow`] (year, optional team or member, trailing weeks), and
//! returns an [`InsightBundle`]:
//!
//! - overdue goals and action plans
//! - plans missing a report for the current Monday–Sunday week
//! - pending deadline-change requests
//! - per-member, per-team and overall rollups (evidence rate, streaks,
//!   progress delta, verification counts)
//! - weekly activity trends and leaderboards
//!
//! Entities that fail validation are listed in [`InsightBundle::skipped`]
//! instead of aborting the pass.

pub mod bundle;
pub mod config;
pub mod history;
pub mod insights;
pub mod scope;
pub mod week;

pub use bundle::{
    BlockerCount, DeadlineRequest, GoalSummary, HealthCounts, InsightBundle, LeaderboardEntry,
    Leaderboards, MemberSummary, MissingReport, OverdueGoal, OverduePlan, PlanSummary,
    ReportSummary, ScopeSummary, SkippedEntity, TeamSummary, VerificationCounts, WeekTrend,
};
pub use config::{
    InsightsConfig, DEFAULT_WINDOW_WEEKS, LEADERBOARD_SIZE, MAX_WINDOW_WEEKS, PROGRESS_DELTA_DAYS,
    TOP_BLOCKERS,
};
pub use history::{ProgressEntry, ProgressHistory, ProgressLog};
pub use insights::{compute_insights, compute_insights_with};
pub use scope::{InsightContext, InsightWindow, Member, ReportStats};
pub use week::{streak_weeks, trailing_weeks, week_end, week_start, Week, WindowRange};
