// config.rs — Insight window and leaderboard sizes.

use serde::{Deserialize, Serialize};

/// Trailing weeks covered by an insight bundle.
pub const DEFAULT_WINDOW_WEEKS: u32 = 8;

/// Longest window accepted; larger requests are clamped.
pub const MAX_WINDOW_WEEKS: u32 = 104;

/// Entries per leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// Distinct blockers listed per member.
pub const TOP_BLOCKERS: usize = 5;

/// How far back the progress delta looks.
pub const PROGRESS_DELTA_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_weeks")]
    pub weeks: u32,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_top_blockers")]
    pub top_blockers: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            weeks: DEFAULT_WINDOW_WEEKS,
            top_n: LEADERBOARD_SIZE,
            top_blockers: TOP_BLOCKERS,
        }
    }
}

// Serde default functions
fn default_weeks() -> u32 {
    DEFAULT_WINDOW_WEEKS
}

fn default_top_n() -> usize {
    LEADERBOARD_SIZE
}

fn default_top_blockers() -> usize {
    TOP_BLOCKERS
}
