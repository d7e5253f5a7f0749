// scope.rs — Inputs to an insight pass: who, when, and what else is known.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use idp_goal::HealthConfig;
use idp_verify::VerificationRequest;

use crate::config::{InsightsConfig, DEFAULT_WINDOW_WEEKS, MAX_WINDOW_WEEKS};
use crate::history::ProgressHistory;
use crate::week::WindowRange;

/// Pre-fetched weekly report presence for one action plan, keyed by plan id
/// in the map passed to the aggregator. Used when a plan's reports are not
/// loaded inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportStats {
    #[serde(default, alias = "lastReportDate", skip_serializing_if = "Option::is_none")]
    pub last_report_date: Option<NaiveDate>,

    /// A report exists in the current Monday–Sunday week.
    #[serde(default, alias = "hasReportInRange")]
    pub has_report_in_range: bool,

    /// Report dates inside the insight window, when the caller has them.
    #[serde(default, alias = "reportDates", skip_serializing_if = "Vec::is_empty")]
    pub report_dates: Vec<NaiveDate>,
}

/// Directory entry for a team member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

impl Member {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            email: None,
            team_id: None,
            team_name: None,
        }
    }

    pub fn in_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Scope of an insight pass: the goal year, an optional team or member
/// filter, and a trailing window ending with the week that contains `now`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsightWindow {
    pub now: DateTime<Utc>,
    pub year: i32,
    pub weeks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl InsightWindow {
    pub fn new(now: DateTime<Utc>, year: i32) -> Self {
        Self {
            now,
            year,
            weeks: DEFAULT_WINDOW_WEEKS,
            team_id: None,
            user_id: None,
        }
    }

    /// Window length, clamped to `1..=MAX_WINDOW_WEEKS`.
    pub fn weeks(mut self, weeks: u32) -> Self {
        self.weeks = weeks.clamp(1, MAX_WINDOW_WEEKS);
        self
    }

    pub fn team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn range(&self) -> WindowRange {
        WindowRange::new(self.now, self.weeks)
    }
}

/// Optional collaborators for a richer pass. Everything defaults to empty.
#[derive(Default)]
pub struct InsightContext<'a> {
    pub members: &'a [Member],
    pub history: Option<&'a dyn ProgressHistory>,
    pub verifications: &'a [VerificationRequest],
    pub health: HealthConfig,
    pub config: InsightsConfig,
}

impl<'a> InsightContext<'a> {
    pub fn with_members(mut self, members: &'a [Member]) -> Self {
        self.members = members;
        self
    }

    pub fn with_history(mut self, history: &'a dyn ProgressHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_verifications(mut self, verifications: &'a [VerificationRequest]) -> Self {
        self.verifications = verifications;
        self
    }

    pub fn with_config(mut self, health: HealthConfig, config: InsightsConfig) -> Self {
        self.health = health;
        self.config = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_accept_camel_case_keys() {
        let stats: ReportStats =
            serde_json::from_str(r#"{"lastReportDate": "2025-06-03", "hasReportInRange": true}"#).unwrap();
        assert!(stats.has_report_in_range);
        assert_eq!(stats.last_report_date, NaiveDate::from_ymd_opt(2025, 6, 3));
        assert!(stats.report_dates.is_empty());
    }
}
