// error.rs — Error types for verification requests and rubric scoring.

use idp_goal::GoalError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Reviewed and Cancelled requests are terminal.
    #[error("cannot {command} verification request {id} in status {status}")]
    InvalidTransition {
        id: Uuid,
        status: String,
        command: &'static str,
    },

    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// A criterion score outside 0–5.
    #[error("score {0} is outside 0-5")]
    ScoreOutOfRange(i64),

    /// Role and ownership failures from the shared actor checks.
    #[error(transparent)]
    Goal(#[from] GoalError),
}

impl VerifyError {
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::InvalidTransition { .. } => "invalid_transition",
            VerifyError::Validation { .. } | VerifyError::ScoreOutOfRange(_) => "validation_error",
            VerifyError::Goal(inner) => inner.kind(),
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        VerifyError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_goal_errors_keep_their_kind() {
        let err: VerifyError = GoalError::Forbidden {
            actor: "member u1".to_string(),
            action: "review".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "forbidden");
        assert_eq!(VerifyError::ScoreOutOfRange(9).kind(), "validation_error");
    }
}
