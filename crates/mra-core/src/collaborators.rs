//! Collaborator contracts at the external boundary
//!
//! The orchestrator core treats plan generation, literature retrieval, the
//! code sandbox and the per-role inference services as opaque asynchronous
//! functions behind these traits. Every operation is attempted exactly once
//! per step and every failure is handled identically by the dispatcher.

use crate::error::CollaboratorError;
use crate::types::PlanStep;
use async_trait::async_trait;

/// Result of a data-gathering call
#[derive(Debug, Clone)]
pub struct GatherOutcome {
    /// The retrieval script that was produced/executed
    pub code: String,
    /// The findings text
    pub output: String,
    /// True when live retrieval failed and a generic fallback was used
    pub is_generic: bool,
}

/// Result of a code generation + execution call
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    /// The generated analysis script
    pub code: String,
    /// Raw execution output of the script
    pub output: String,
}

/// Planning collaborator: turns a goal into an ordered plan
#[async_trait]
pub trait Planner: Send + Sync {
    /// Generate a plan for the given goal
    ///
    /// # Errors
    /// Fails with a descriptive error on a malformed or unavailable
    /// upstream response; the failure is fatal to the run.
    async fn generate_plan(&self, goal: &str) -> Result<Vec<PlanStep>, CollaboratorError>;
}

/// Per-role execution collaborators
///
/// One method per dispatchable role. `description` is the step text;
/// `context` is the rolling transcript of goal plus prior step outputs.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Literature/data retrieval for a DATA_GATHERER step
    async fn gather(&self, description: &str) -> Result<GatherOutcome, CollaboratorError>;

    /// Environment configuration for an ENV_SETUP step
    async fn setup_env(
        &self,
        description: &str,
        context: &str,
    ) -> Result<String, CollaboratorError>;

    /// Code generation and sandboxed execution for a CODE_GENERATOR step
    async fn generate_code(
        &self,
        description: &str,
        context: &str,
    ) -> Result<GeneratedCode, CollaboratorError>;

    /// Result interpretation for a RESULT_ANALYZER step
    async fn analyze(&self, description: &str, context: &str)
        -> Result<String, CollaboratorError>;

    /// Report writing for a DOCUMENTATION step
    async fn document(
        &self,
        description: &str,
        context: &str,
    ) -> Result<String, CollaboratorError>;
}
