// error.rs — Error types for the goal and action plan workflow.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while applying workflow commands or validating records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalError {
    /// The command is not allowed from the entity's current review state.
    #[error("cannot {command} {entity} {id} while {from}")]
    InvalidTransition {
        entity: &'static str,
        id: Uuid,
        from: String,
        command: String,
    },

    /// The action plan already used every allowed deadline change.
    #[error("action plan {action_plan_id} already used all {limit} deadline changes")]
    DeadlineChangeLimitExceeded { action_plan_id: Uuid, limit: u8 },

    /// A field is missing, malformed, or out of range.
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The actor's role or ownership does not permit the command.
    #[error("{actor} is not allowed to {action}")]
    Forbidden { actor: String, action: String },

    /// The referenced record does not exist in the caller's snapshot.
    #[error("record not found: {0}")]
    NotFound(Uuid),
}

impl GoalError {
    /// Stable machine-readable kind, reported next to the display message.
    pub fn kind(&self) -> &'static str {
        match self {
            GoalError::InvalidTransition { .. } => "invalid_transition",
            GoalError::DeadlineChangeLimitExceeded { .. } => "deadline_change_limit_exceeded",
            GoalError::Validation { .. } => "validation_error",
            GoalError::Forbidden { .. } => "forbidden",
            GoalError::NotFound(_) => "not_found",
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        GoalError::Validation {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_snake_case() {
        let err = GoalError::DeadlineChangeLimitExceeded {
            action_plan_id: Uuid::nil(),
            limit: 3,
        };
        assert_eq!(err.kind(), "deadline_change_limit_exceeded");
        assert_eq!(
            GoalError::validation("progress", "must be 0-100").kind(),
            "validation_error"
        );
    }

    #[test]
    fn display_includes_command_and_state() {
        let err = GoalError::InvalidTransition {
            entity: "goal",
            id: Uuid::nil(),
            from: "pending_review".to_string(),
            command: "request_review".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("request_review"));
        assert!(msg.contains("pending_review"));
    }
}
