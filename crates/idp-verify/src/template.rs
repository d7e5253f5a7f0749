// template.rs — Verification templates and the rubric snapshot.
//
// A template is a live catalog entry that admins may edit at any time. When
// a member submits a request, the template's criteria and evidence list are
// copied into a `RubricSnapshot` so the request is graded against what the
// member saw, not against later edits.

use serde::{Deserialize, Serialize};

/// How a template is graded. Values this crate does not know keep their
/// stored text so a rewrite does not change them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ScoringType {
    Rubric,
    PassFail,
    Other(String),
}

impl ScoringType {
    pub fn as_str(&self) -> &str {
        match self {
            ScoringType::Rubric => "rubric",
            ScoringType::PassFail => "passfail",
            ScoringType::Other(raw) => raw,
        }
    }
}

impl From<String> for ScoringType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "rubric" => ScoringType::Rubric,
            "passfail" => ScoringType::PassFail,
            _ => ScoringType::Other(raw),
        }
    }
}

impl From<ScoringType> for String {
    fn from(scoring: ScoringType) -> Self {
        match scoring {
            ScoringType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One rubric criterion as authored. Every field may be missing in stored data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Criterion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// A criterion with ids, labels and weights filled in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedCriterion {
    pub id: String,
    pub label: String,
    pub description: String,
    pub weight: f64,
}

/// An evidence item a template asks for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequiredEvidence {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    /// Absent means required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl RequiredEvidence {
    pub fn is_required(&self) -> bool {
        self.required != Some(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationTemplate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub scoring_type: ScoringType,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub required_evidence: Vec<RequiredEvidence>,
    /// Display-only passing threshold; never used to decide a result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_bar: Option<serde_json::Value>,
}

impl VerificationTemplate {
    pub fn required_evidence_count(&self) -> usize {
        self.required_evidence.iter().filter(|e| e.is_required()).count()
    }

    pub fn snapshot(&self) -> RubricSnapshot {
        RubricSnapshot {
            template_id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            criteria: self.criteria.clone(),
            required_evidence: self.required_evidence.clone(),
            scoring_type: Some(self.scoring_type.clone()),
            minimum_bar: self.minimum_bar.clone(),
        }
    }
}

/// Template content frozen at submission time. Empty for custom requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RubricSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<Criterion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_evidence: Vec<RequiredEvidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring_type: Option<ScoringType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_bar: Option<serde_json::Value>,
}

/// Fill in missing ids (`c1`, `c2`, …) and labels (`Criteria 1`, …), and
/// default any unusable weight (missing, non-finite, zero or negative) to 1.
pub fn normalize_criteria(criteria: &[Criterion]) -> Vec<NormalizedCriterion> {
    criteria
        .iter()
        .enumerate()
        .map(|(idx, c)| NormalizedCriterion {
            id: c
                .id
                .as_deref()
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("c{}", idx + 1)),
            label: if c.label.is_empty() {
                format!("Criteria {}", idx + 1)
            } else {
                c.label.clone()
            },
            description: c.description.clone().unwrap_or_default(),
            weight: match c.weight {
                Some(w) if w.is_finite() && w > 0.0 => w,
                _ => 1.0,
            },
        })
        .collect()
}
