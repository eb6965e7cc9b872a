//! Error types for the MRA orchestrator
//!
//! Two error surfaces exist:
//! - [`CollaboratorError`] for failures at the external boundary (plan
//!   generation and per-role agent calls)
//! - [`StateError`] for violations of the run-state invariants

use crate::types::{StepId, StepStatus};

/// Failure raised by an external collaborator call
///
/// All six collaborator operations fail with this single shape: a
/// human-readable message. `Display` renders the bare message, so the
/// dispatcher's containment rule (`"Error: " + message`) reproduces the
/// collaborator's words exactly.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CollaboratorError {
    /// Human-readable failure description
    pub message: String,
}

impl CollaboratorError {
    /// Create a collaborator error from any message-like value
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for CollaboratorError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CollaboratorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Run-state invariant violations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateError {
    /// Step status transition outside the lifecycle relation
    #[error("illegal step transition: {from:?} -> {to:?} ({step})")]
    IllegalTransition {
        /// Step whose transition was rejected
        step: StepId,
        /// Status before the attempt
        from: StepStatus,
        /// Requested status
        to: StepStatus,
    },

    /// Step id not present in the current plan
    #[error("unknown step: {0}")]
    UnknownStep(StepId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_error_displays_bare_message() {
        let err = CollaboratorError::new("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(format!("Error: {err}"), "Error: boom");
    }

    #[test]
    fn state_error_display() {
        let err = StateError::UnknownStep(StepId::new("s9"));
        assert!(err.to_string().contains("unknown step: s9"));
    }
}
