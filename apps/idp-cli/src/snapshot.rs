// snapshot.rs — The JSON snapshot file the CLI reads and rewrites.
//
// Layout of `<data-dir>/snapshot.json`:
//
//   { "goals": [...], "report_stats": {plan_id: {...}}, "members": [...],
//     "verifications": [...], "templates": [...], "progress_history": [...] }
//
// Every key is optional. Goals and verification requests are read one record
// at a time: a record that does not parse is reported as skipped, and its raw
// JSON is written back untouched on save.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use idp_goal::{ActionPlan, Goal, GoalError};
use idp_insights::{Member, ProgressLog, ReportStats, SkippedEntity};
use idp_verify::{VerificationRequest, VerificationTemplate};

pub const SNAPSHOT_FILE: &str = "snapshot.json";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub goals: Vec<Goal>,

    pub report_stats: HashMap<Uuid, ReportStats>,

    pub members: Vec<Member>,

    pub verifications: Vec<VerificationRequest>,

    pub templates: Vec<VerificationTemplate>,

    pub progress_history: ProgressLog,

    /// Records left out at load time.
    #[serde(skip)]
    pub skipped: Vec<SkippedEntity>,

    #[serde(skip)]
    unreadable: Unreadable,
}

/// Raw JSON of records that failed to parse, kept for the next save.
#[derive(Debug, Clone, Default)]
struct Unreadable {
    goals: Vec<Value>,
    verifications: Vec<Value>,
}

/// On-disk layout with the tolerant collections left as raw JSON.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    goals: Vec<Value>,

    #[serde(default, alias = "weekly_report_stats")]
    report_stats: HashMap<Uuid, ReportStats>,

    #[serde(default)]
    members: Vec<Member>,

    #[serde(default)]
    verifications: Vec<Value>,

    #[serde(default)]
    templates: Vec<VerificationTemplate>,

    #[serde(default)]
    progress_history: ProgressLog,
}

impl Snapshot {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SNAPSHOT_FILE)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading snapshot {}", path.display()))?;
        let raw: RawSnapshot =
            serde_json::from_str(&content).with_context(|| format!("parsing snapshot {}", path.display()))?;

        let mut skipped = Vec::new();
        let mut unreadable = Unreadable::default();
        let goals = parse_records("goal", raw.goals, &mut skipped, &mut unreadable.goals);
        let verifications = parse_records(
            "verification_request",
            raw.verifications,
            &mut skipped,
            &mut unreadable.verifications,
        );
        Ok(Self {
            goals,
            report_stats: raw.report_stats,
            members: raw.members,
            verifications,
            templates: raw.templates,
            progress_history: raw.progress_history,
            skipped,
            unreadable,
        })
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut doc = serde_json::to_value(self)?;
        if let Some(fields) = doc.as_object_mut() {
            append_raw(fields, "goals", &self.unreadable.goals);
            append_raw(fields, "verifications", &self.unreadable.verifications);
        }
        let json = serde_json::to_string_pretty(&doc)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
        tracing::debug!(path = %path.display(), goals = self.goals.len(), "snapshot saved");
        Ok(())
    }

    pub fn goal(&self, id: Uuid) -> Result<&Goal, GoalError> {
        self.goals.iter().find(|g| g.id == id).ok_or(GoalError::NotFound(id))
    }

    pub fn goal_mut(&mut self, id: Uuid) -> Result<&mut Goal, GoalError> {
        self.goals.iter_mut().find(|g| g.id == id).ok_or(GoalError::NotFound(id))
    }

    pub fn plan(&self, id: Uuid) -> Result<&ActionPlan, GoalError> {
        self.goals
            .iter()
            .flat_map(|g| g.action_plans.iter())
            .find(|p| p.id == id)
            .ok_or(GoalError::NotFound(id))
    }

    pub fn plan_mut(&mut self, id: Uuid) -> Result<&mut ActionPlan, GoalError> {
        self.goals
            .iter_mut()
            .flat_map(|g| g.action_plans.iter_mut())
            .find(|p| p.id == id)
            .ok_or(GoalError::NotFound(id))
    }

    pub fn verification(&self, id: Uuid) -> Result<&VerificationRequest, GoalError> {
        self.verifications
            .iter()
            .find(|v| v.id == id)
            .ok_or(GoalError::NotFound(id))
    }
}

fn parse_records<T: DeserializeOwned>(
    kind: &str,
    raw: Vec<Value>,
    skipped: &mut Vec<SkippedEntity>,
    unreadable: &mut Vec<Value>,
) -> Vec<T> {
    let mut records = Vec::with_capacity(raw.len());
    for value in raw {
        match T::deserialize(&value) {
            Ok(record) => records.push(record),
            Err(err) => {
                let id = record_id(&value);
                tracing::warn!(kind, id = %id, error = %err, "skipping unreadable snapshot record");
                skipped.push(SkippedEntity {
                    kind: kind.to_string(),
                    id,
                    reason: err.to_string(),
                });
                unreadable.push(value);
            }
        }
    }
    records
}

/// The record's `id` when it is a UUID, else the nil UUID.
fn record_id(value: &Value) -> Uuid {
    value
        .get("id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
        .unwrap_or_else(Uuid::nil)
}

fn append_raw(doc: &mut Map<String, Value>, key: &str, raw: &[Value]) {
    if raw.is_empty() {
        return;
    }
    if let Some(Value::Array(items)) = doc.get_mut(key) {
        items.extend(raw.iter().cloned());
    }
}
