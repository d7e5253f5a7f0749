// rubric.rs — Weighted rubric scoring and the evidence checklist.
//
// The score is advisory: the reviewing leader still picks Pass, NeedsWork
// or Fail by hand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::template::{NormalizedCriterion, RequiredEvidence};

/// Highest score a single criterion can receive.
pub const MAX_CRITERION_SCORE: u8 = 5;

/// A per-criterion score, guaranteed to lie in 0–5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "u8")]
pub struct CriterionScore(u8);

impl CriterionScore {
    pub fn new(value: i64) -> Result<Self, VerifyError> {
        if (0..=i64::from(MAX_CRITERION_SCORE)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(VerifyError::ScoreOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for CriterionScore {
    type Error = VerifyError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CriterionScore> for u8 {
    fn from(score: CriterionScore) -> Self {
        score.0
    }
}

/// Computed rubric totals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RubricScore {
    pub weighted: f64,
    pub max_weighted: f64,
    /// `weighted / max_weighted * 5`, rounded to two decimals; 0 for an
    /// empty rubric.
    pub avg_on_5: f64,
}

/// Score `criteria` against `scores` (criterion id → score). Criteria with
/// no score count as 0.
pub fn score_rubric(
    criteria: &[NormalizedCriterion],
    scores: &BTreeMap<String, CriterionScore>,
) -> RubricScore {
    let mut weighted = 0.0;
    let mut max_weighted = 0.0;
    for criterion in criteria {
        let score = scores.get(&criterion.id).map(|s| s.get()).unwrap_or(0);
        weighted += f64::from(score) * criterion.weight;
        max_weighted += f64::from(MAX_CRITERION_SCORE) * criterion.weight;
    }
    let avg_on_5 = if max_weighted > 0.0 {
        round2(weighted / max_weighted * f64::from(MAX_CRITERION_SCORE))
    } else {
        0.0
    };
    RubricScore {
        weighted,
        max_weighted,
        avg_on_5,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceState {
    Attached,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceItem {
    pub kind: String,
    pub label: String,
    pub state: EvidenceState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceChecklist {
    pub items: Vec<EvidenceItem>,
    pub required_count: usize,
    pub attached_links: usize,
    /// How many more links are needed to cover every required item.
    pub links_short_by: usize,
}

impl EvidenceChecklist {
    pub fn is_complete(&self) -> bool {
        self.links_short_by == 0
    }
}

/// Mark each required item attached when any evidence link exists. Items are
/// not matched to individual links; `links_short_by` gives the count gap.
pub fn evidence_checklist(required: &[RequiredEvidence], evidence_links: &[String]) -> EvidenceChecklist {
    let attached_links = evidence_links.iter().filter(|l| !l.trim().is_empty()).count();
    let state = if attached_links > 0 {
        EvidenceState::Attached
    } else {
        EvidenceState::Missing
    };
    let items: Vec<EvidenceItem> = required
        .iter()
        .filter(|e| e.is_required())
        .map(|e| EvidenceItem {
            kind: e.kind.clone(),
            label: e.label.clone(),
            state,
        })
        .collect();
    let required_count = items.len();
    EvidenceChecklist {
        items,
        required_count,
        attached_links,
        links_short_by: required_count.saturating_sub(attached_links),
    }
}
