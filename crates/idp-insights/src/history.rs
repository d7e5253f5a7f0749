// history.rs — Goal progress snapshots for week-over-week deltas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source of past goal progress values.
pub trait ProgressHistory {
    /// Latest recorded progress for `goal_id` at or before `at`.
    fn progress_at(&self, goal_id: Uuid, at: DateTime<Utc>) -> Option<u8>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEntry {
    pub goal_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub progress: u8,
}

/// In-memory progress history.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProgressLog {
    entries: Vec<ProgressEntry>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, goal_id: Uuid, progress: u8, recorded_at: DateTime<Utc>) {
        self.entries.push(ProgressEntry {
            goal_id,
            recorded_at,
            progress,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProgressHistory for ProgressLog {
    fn progress_at(&self, goal_id: Uuid, at: DateTime<Utc>) -> Option<u8> {
        self.entries
            .iter()
            .filter(|e| e.goal_id == goal_id && e.recorded_at <= at)
            .max_by_key(|e| e.recorded_at)
            .map(|e| e.progress)
    }
}
