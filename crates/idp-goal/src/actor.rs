// actor.rs — Who is issuing a command.
//
// Authentication happens elsewhere; the workflow only needs the caller's
// identity and role to decide whether a command is theirs to issue.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GoalError;

/// Role of the caller within the organisation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Leader,
    Manager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Leader => write!(f, "leader"),
            Role::Manager => write!(f, "manager"),
        }
    }
}

/// The identity issuing a workflow command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn member(id: impl Into<String>) -> Self {
        Self::new(id, Role::Member)
    }

    pub fn leader(id: impl Into<String>) -> Self {
        Self::new(id, Role::Leader)
    }

    /// Leaders and managers may decide reviews.
    pub fn can_review(&self) -> bool {
        matches!(self.role, Role::Leader | Role::Manager)
    }

    /// Fails with `Forbidden` unless this actor owns the record.
    pub fn require_owner(&self, owner_id: &str, action: &str) -> Result<(), GoalError> {
        if self.id == owner_id {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    /// Fails with `Forbidden` unless this actor is a leader or manager.
    pub fn require_reviewer(&self, action: &str) -> Result<(), GoalError> {
        if self.can_review() {
            Ok(())
        } else {
            Err(self.forbidden(action))
        }
    }

    fn forbidden(&self, action: &str) -> GoalError {
        GoalError::Forbidden {
            actor: format!("{} {}", self.role, self.id),
            action: action.to_string(),
        }
    }
}
