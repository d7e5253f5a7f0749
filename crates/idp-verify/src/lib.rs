//! # idp-verify
//!
//! Leader-graded verification of a member's claimed skill.
//!
//! A member submits a [`VerificationRequest`] against one of their goals,
//! optionally following a [`VerificationTemplate`]. The template's rubric is
//! frozen into the request at submission so later catalog edits do not
//! change how it is graded.
//!
//! ## Key components
//!
//! - [`score_rubric`] — weighted score and `avg_on_5` from 0–5 criterion scores
//! - [`evidence_checklist`] — required evidence items marked attached or missing
//! - [`VerificationRequest::review`] — attaches the leader's verdict and the
//!   advisory score; the verdict itself is always chosen by the leader

pub mod error;
pub mod request;
pub mod rubric;
pub mod template;

pub use error::VerifyError;
pub use request::{
    ReviewResult, Submission, Verdict, VerificationRequest, VerificationReview, VerificationStatus,
};
pub use rubric::{
    evidence_checklist, score_rubric, CriterionScore, EvidenceChecklist, EvidenceItem,
    EvidenceState, RubricScore, MAX_CRITERION_SCORE,
};
pub use template::{
    normalize_criteria, Criterion, NormalizedCriterion, RequiredEvidence, RubricSnapshot,
    ScoringType, VerificationTemplate,
};
