//! Plan executor: the ordered walk over a run's plan
//!
//! Drives each step through its status lifecycle, checks for cooperative
//! cancellation at step boundaries, and accumulates the rolling textual
//! context handed to every subsequent step. Steps run strictly one at a
//! time: each step's meaningful input is the concatenation of all prior
//! step outputs, so there is nothing safe to parallelize.

use crate::dispatch::StepDispatcher;
use crate::state::StateHandle;
use crate::store::LogRole;
use crate::types::{AgentRole, StepStatus};
use tokio_util::sync::CancellationToken;

/// Executes the plan stored in the shared run state
pub struct PlanExecutor {
    state: StateHandle,
    dispatcher: StepDispatcher,
}

impl PlanExecutor {
    /// Create an executor over the shared run state
    #[inline]
    #[must_use]
    pub fn new(state: StateHandle, dispatcher: StepDispatcher) -> Self {
        Self { state, dispatcher }
    }

    /// Run the plan to completion or cancellation
    ///
    /// Cancellation is checked before each step begins and again after its
    /// dispatch returns; a step already in flight always runs to
    /// completion on the collaborator side. Dispatch failures are contained
    /// below this boundary and never halt the walk - only cancellation
    /// marks a step `Failed`.
    pub async fn run(&self, goal: &str, token: &CancellationToken) {
        let mut context = format!("Original Goal: {goal}\n\n");

        let steps = self.state.read().await.plan.clone();
        tracing::info!(steps = steps.len(), "executing plan");

        for step in &steps {
            if token.is_cancelled() {
                self.state.write().await.log(
                    LogRole::System,
                    "Workflow execution aborted.",
                    None,
                );
                tracing::info!(step = %step.id, "plan aborted before step");
                return;
            }

            {
                let mut state = self.state.write().await;
                state.current_step_id = Some(step.id.clone());
                if let Err(err) = state.transition_step(&step.id, StepStatus::Running) {
                    tracing::error!(error = %err, "step lifecycle violation");
                }
            }

            let result = self.dispatcher.execute(step, &context).await;

            // Re-check after the call returns: a stop during the step
            // abandons its result and marks it failed.
            if token.is_cancelled() {
                let mut state = self.state.write().await;
                if let Err(err) = state.transition_step(&step.id, StepStatus::Failed) {
                    tracing::error!(error = %err, "step lifecycle violation");
                }
                tracing::info!(step = %step.id, "plan cancelled during step");
                return;
            }

            context.push_str(&format!(
                "\n\n--- Output from {} ---\n{}",
                step.assigned_agent, result
            ));

            let mut state = self.state.write().await;
            if let Err(err) = state.transition_step(&step.id, StepStatus::Completed) {
                tracing::error!(error = %err, "step lifecycle violation");
            }
            if let Err(err) = state.record_step_output(&step.id, result) {
                tracing::error!(error = %err, "step lifecycle violation");
            }
        }

        let mut state = self.state.write().await;
        state.log(
            LogRole::Agent,
            "All tasks completed successfully. Protocol finished.",
            Some(AgentRole::Manager),
        );
        state.is_processing = false;
        state.current_step_id = None;
        tracing::info!("plan complete");
    }
}

// Executor behavior tests live in tests/executor_tests.rs: they use
// mra_test_utils, which links against the mra-core library crate and so
// cannot be referenced from the unit-test build of this crate.
