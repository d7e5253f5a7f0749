// verify.rs — Verification subcommands: rubric score preview, evidence checklist.

use std::collections::BTreeMap;

use anyhow::Context;
use clap::Subcommand;
use serde::Serialize;
use uuid::Uuid;

use idp_verify::{
    score_rubric, CriterionScore, NormalizedCriterion, RubricScore, VerificationRequest,
    VerificationTemplate,
};

use super::{print_json, Env};

#[derive(Subcommand)]
pub enum VerifyCommands {
    /// Preview the weighted rubric score for a set of criterion scores.
    Score {
        /// Verification request ID.
        id: Uuid,
        /// Criterion score as `criterion_id=0..5`; repeatable.
        #[arg(long = "score", value_name = "ID=SCORE")]
        scores: Vec<String>,
    },
    /// Show which required evidence items are attached.
    Checklist {
        /// Verification request ID.
        id: Uuid,
    },
}

#[derive(Debug, Serialize)]
struct ScorePreview {
    criteria: Vec<NormalizedCriterion>,
    scores: BTreeMap<String, CriterionScore>,
    #[serde(flatten)]
    score: RubricScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_bar: Option<serde_json::Value>,
}

pub fn execute(cmd: &VerifyCommands, env: &Env) -> anyhow::Result<()> {
    let snapshot = env.load()?;
    match cmd {
        VerifyCommands::Score { id, scores } => {
            let request = snapshot.verification(*id)?;
            print_json(&score_preview(request, scores, &snapshot.templates)?)
        }
        VerifyCommands::Checklist { id } => {
            let request = snapshot.verification(*id)?;
            print_json(&request.checklist(&snapshot.templates))
        }
    }
}

fn score_preview(
    request: &VerificationRequest,
    raw: &[String],
    templates: &[VerificationTemplate],
) -> anyhow::Result<ScorePreview> {
    let scores = parse_scores(raw)?;
    let criteria = request.check_scores(&scores, templates)?;
    Ok(ScorePreview {
        score: score_rubric(&criteria, &scores),
        minimum_bar: request.minimum_bar(templates).cloned(),
        criteria,
        scores,
    })
}

fn parse_scores(raw: &[String]) -> anyhow::Result<BTreeMap<String, CriterionScore>> {
    raw.iter()
        .map(|pair| -> anyhow::Result<(String, CriterionScore)> {
            let (id, value) = pair
                .split_once('=')
                .with_context(|| format!("expected ID=SCORE, got {pair:?}"))?;
            let value: i64 = value
                .trim()
                .parse()
                .with_context(|| format!("score for {id} is not an integer"))?;
            Ok((id.trim().to_string(), CriterionScore::new(value)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use idp_goal::{Actor, Goal, GoalDraft};
    use idp_verify::Submission;

    fn template() -> VerificationTemplate {
        serde_json::from_value(serde_json::json!({
            "id": "k8s",
            "name": "Kubernetes operator",
            "scoring_type": "rubric",
            "criteria": [
                {"id": "design", "label": "Design", "weight": 1},
                {"id": "ops", "label": "Operations", "weight": 3}
            ],
            "minimum_bar": {"avg": 3}
        }))
        .unwrap()
    }

    fn request(templates: &[VerificationTemplate]) -> VerificationRequest {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let goal = Goal::new(
            GoalDraft {
                name: "Run a production cluster".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                time_bound: NaiveDate::from_ymd_opt(2025, 12, 31),
                ..GoalDraft::default()
            },
            "m1",
            now,
        )
        .unwrap();
        VerificationRequest::submit(
            &goal,
            Submission {
                template_id: Some("k8s".to_string()),
                scope: "Cluster upgrades".to_string(),
                ..Submission::default()
            },
            &Actor::member("m1"),
            templates,
            now,
        )
        .unwrap()
    }

    #[test]
    fn preview_rejects_unknown_criterion_ids() {
        let templates = vec![template()];
        let request = request(&templates);
        let err = score_preview(&request, &["design=4".to_string(), "typo=5".to_string()], &templates)
            .unwrap_err();
        assert!(err.to_string().contains("typo"));
    }

    #[test]
    fn preview_scores_known_criteria() {
        let templates = vec![template()];
        let request = request(&templates);
        let preview = score_preview(&request, &["design=4".to_string(), "ops=2".to_string()], &templates).unwrap();
        assert_eq!(preview.criteria.len(), 2);
        assert_eq!(preview.scores.len(), 2);
        assert_eq!(preview.minimum_bar, Some(serde_json::json!({"avg": 3})));
    }

    #[test]
    fn scores_parse_from_pairs() {
        let parsed = parse_scores(&["c1=3".to_string(), " depth = 5".to_string()]).unwrap();
        assert_eq!(parsed["c1"].get(), 3);
        assert_eq!(parsed["depth"].get(), 5);
    }

    #[test]
    fn bad_pairs_are_rejected() {
        assert!(parse_scores(&["c1".to_string()]).is_err());
        assert!(parse_scores(&["c1=x".to_string()]).is_err());
        assert!(parse_scores(&["c1=6".to_string()]).is_err());
    }
}
