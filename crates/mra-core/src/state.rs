//! Mutable run state and read-only snapshots
//!
//! The whole of a run's observable state lives in one [`RunState`]
//! aggregate owned by the controller/executor pair. There is exactly one
//! logical writer at any time; the aggregate sits behind a single `RwLock`
//! only so readers can take consistent [`RunSnapshot`] clones. Readers
//! never mutate.

use crate::error::StateError;
use crate::store::{Artifact, ArtifactStore, LogEntry, LogRole, LogStore};
use crate::types::{AgentRole, PlanStep, StepId, StepStatus};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the run state
pub type StateHandle = Arc<RwLock<RunState>>;

/// The aggregate state of one workflow run
///
/// `execution_output` is the execution side-channel: a single slot holding
/// the most recent raw code-execution output. CODE_GENERATOR produces it,
/// RESULT_ANALYZER consumes it, and every reset clears it so a value can
/// never leak across runs.
#[derive(Debug, Default)]
pub struct RunState {
    /// Whether a run is currently in flight
    pub is_processing: bool,
    /// Id of the step currently being executed
    pub current_step_id: Option<StepId>,
    /// Run transcript
    pub logs: LogStore,
    /// The plan being executed; order defines execution order
    pub plan: Vec<PlanStep>,
    /// Artifacts produced so far
    pub artifacts: ArtifactStore,
    /// Execution side-channel (most recent raw execution output)
    pub execution_output: Option<String>,
}

impl RunState {
    /// Create an empty, idle state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transcript entry
    pub fn log(
        &mut self,
        role: LogRole,
        content: impl Into<String>,
        agent_role: Option<AgentRole>,
    ) {
        self.logs.append(LogEntry::new(role, content, agent_role));
    }

    /// Append an artifact
    pub fn push_artifact(&mut self, artifact: Artifact) {
        self.artifacts.append(artifact);
    }

    /// Install the generated plan
    pub fn set_plan(&mut self, plan: Vec<PlanStep>) {
        self.plan = plan;
    }

    /// Find a step by id
    #[must_use]
    pub fn step(&self, id: &StepId) -> Option<&PlanStep> {
        self.plan.iter().find(|s| &s.id == id)
    }

    /// Advance a step's status, enforcing the lifecycle relation
    ///
    /// # Errors
    /// [`StateError::UnknownStep`] if `id` is not in the plan,
    /// [`StateError::IllegalTransition`] if the lifecycle forbids the move.
    pub fn transition_step(&mut self, id: &StepId, to: StepStatus) -> Result<(), StateError> {
        let step = self
            .plan
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| StateError::UnknownStep(id.clone()))?;

        if !step.status.can_advance_to(to) {
            return Err(StateError::IllegalTransition {
                step: id.clone(),
                from: step.status,
                to,
            });
        }

        step.status = to;
        Ok(())
    }

    /// Record a step's result text
    ///
    /// # Errors
    /// [`StateError::UnknownStep`] if `id` is not in the plan.
    pub fn record_step_output(
        &mut self,
        id: &StepId,
        output: impl Into<String>,
    ) -> Result<(), StateError> {
        let step = self
            .plan
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| StateError::UnknownStep(id.clone()))?;
        step.output = Some(output.into());
        Ok(())
    }

    /// Take a consistent read-only snapshot
    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            is_processing: self.is_processing,
            current_step_id: self.current_step_id.clone(),
            logs: self.logs.entries().to_vec(),
            plan: self.plan.clone(),
            artifacts: self.artifacts.artifacts().to_vec(),
            execution_output: self.execution_output.clone(),
        }
    }
}

/// Immutable view of the run state handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    /// Whether a run is currently in flight
    #[serde(rename = "isProcessing")]
    pub is_processing: bool,
    /// Id of the step currently being executed
    #[serde(rename = "currentStepId")]
    pub current_step_id: Option<StepId>,
    /// Full transcript, insertion-ordered
    pub logs: Vec<LogEntry>,
    /// The plan with current statuses
    pub plan: Vec<PlanStep>,
    /// Artifacts produced so far, insertion-ordered
    pub artifacts: Vec<Artifact>,
    /// Execution side-channel value, for display only
    #[serde(rename = "executionOutput", skip_serializing_if = "Option::is_none")]
    pub execution_output: Option<String>,
}
