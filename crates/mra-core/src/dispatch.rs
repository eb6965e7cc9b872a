//! Step dispatcher: routes a step to its agent handler
//!
//! Maps each agent role to the corresponding collaborator call, appends the
//! resulting artifacts and transcript entries, and normalizes the outcome
//! into a result string for the executor. The `execute` boundary is
//! infallible: any collaborator failure is contained here, logged, and
//! converted to `"Error: {message}"`.

use crate::collaborators::AgentBackend;
use crate::error::CollaboratorError;
use crate::state::StateHandle;
use crate::store::{Artifact, ArtifactKind, LogRole};
use crate::types::{AgentRole, PlanStep, WorkflowConfig};
use std::sync::Arc;
use tokio::time::sleep;

/// Routes plan steps to collaborator calls and records their side effects
pub struct StepDispatcher {
    state: StateHandle,
    agents: Arc<dyn AgentBackend>,
    config: WorkflowConfig,
}

impl StepDispatcher {
    /// Create a dispatcher over the shared run state
    #[inline]
    #[must_use]
    pub fn new(state: StateHandle, agents: Arc<dyn AgentBackend>, config: WorkflowConfig) -> Self {
        Self {
            state,
            agents,
            config,
        }
    }

    /// Execute one step and return its result string
    ///
    /// Always resolves. A successful dispatch appends an `agent` transcript
    /// entry attributed to the step's role; a failed one appends a `system`
    /// entry and yields the error text as the result.
    pub async fn execute(&self, step: &PlanStep, context: &str) -> String {
        sleep(self.config.pre_step_delay).await;

        match self.dispatch(step, context).await {
            Ok(result) => {
                tracing::debug!(step = %step.id, role = %step.assigned_agent, "step dispatched");
                self.state.write().await.log(
                    LogRole::Agent,
                    result.clone(),
                    Some(step.assigned_agent),
                );
                result
            }
            Err(err) => {
                tracing::warn!(
                    step = %step.id,
                    role = %step.assigned_agent,
                    error = %err,
                    "step dispatch failed"
                );
                self.state.write().await.log(
                    LogRole::System,
                    format!("Error executing step: {err}"),
                    None,
                );
                format!("Error: {err}")
            }
        }
    }

    async fn dispatch(&self, step: &PlanStep, context: &str) -> Result<String, CollaboratorError> {
        match step.assigned_agent {
            AgentRole::DataGatherer => self.run_data_gatherer(step).await,
            AgentRole::EnvSetup => self.run_env_setup(step, context).await,
            AgentRole::CodeGenerator => self.run_code_generator(step, context).await,
            AgentRole::ResultAnalyzer => self.run_result_analyzer(step, context).await,
            AgentRole::Documentation => self.run_documentation(step, context).await,
            // Planner and manager steps have no handler of their own
            AgentRole::Planner | AgentRole::Manager => Ok("Task completed.".to_string()),
        }
    }

    async fn run_data_gatherer(&self, step: &PlanStep) -> Result<String, CollaboratorError> {
        self.state.write().await.log(
            LogRole::System,
            "Executing ArXiv search script...",
            Some(AgentRole::DataGatherer),
        );

        let outcome = self.agents.gather(&step.description).await?;

        let mut state = self.state.write().await;
        if outcome.is_generic {
            state.log(
                LogRole::System,
                "Warning: ArXiv search failed or returned no results. Using fallback.",
                Some(AgentRole::DataGatherer),
            );
        }
        state.push_artifact(
            Artifact::new(ArtifactKind::Code, "ArXiv Search Script", outcome.code)
                .with_language("python"),
        );
        state.push_artifact(Artifact::new(
            ArtifactKind::Data,
            "Research Data",
            outcome.output.clone(),
        ));

        Ok(outcome.output)
    }

    async fn run_env_setup(
        &self,
        step: &PlanStep,
        context: &str,
    ) -> Result<String, CollaboratorError> {
        let config = self.agents.setup_env(&step.description, context).await?;
        self.state.write().await.push_artifact(Artifact::new(
            ArtifactKind::Env,
            "Environment Config",
            config.clone(),
        ));
        Ok(config)
    }

    async fn run_code_generator(
        &self,
        step: &PlanStep,
        context: &str,
    ) -> Result<String, CollaboratorError> {
        self.state.write().await.log(
            LogRole::System,
            "Generating and executing analysis code...",
            Some(AgentRole::CodeGenerator),
        );

        let generated = self.agents.generate_code(&step.description, context).await?;

        let mut state = self.state.write().await;
        state.push_artifact(
            Artifact::new(ArtifactKind::Code, "Analysis Script", generated.code)
                .with_language("python"),
        );
        // Full output goes to the side-channel for the analyzer; only a
        // bounded preview enters the rolling context.
        let result = format!(
            "Code Generated and Executed.\nOutput Preview:\n{}...",
            preview(&generated.output, self.config.preview_chars)
        );
        state.execution_output = Some(generated.output);

        Ok(result)
    }

    async fn run_result_analyzer(
        &self,
        step: &PlanStep,
        context: &str,
    ) -> Result<String, CollaboratorError> {
        let effective_context = {
            let state = self.state.read().await;
            match &state.execution_output {
                Some(output) => format!("Actual Execution Output:\n{output}\n\n{context}"),
                None => format!(
                    "Code has been generated but execution output is missing. \
                     Analyze logic only.\n\n{context}"
                ),
            }
        };

        let insights = self
            .agents
            .analyze(&step.description, &effective_context)
            .await?;

        self.state.write().await.push_artifact(Artifact::new(
            ArtifactKind::Analysis,
            "Analysis Insights",
            insights.clone(),
        ));

        Ok(insights)
    }

    async fn run_documentation(
        &self,
        step: &PlanStep,
        context: &str,
    ) -> Result<String, CollaboratorError> {
        let report = self.agents.document(&step.description, context).await?;
        self.state.write().await.push_artifact(Artifact::new(
            ArtifactKind::Doc,
            "Final Report",
            report.clone(),
        ));
        Ok(report)
    }
}

/// First `max_chars` characters of `text`, on a char boundary
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// Dispatcher behavior tests live in tests/dispatch_tests.rs: they use
// mra_test_utils, which links against the mra-core library crate and so
// cannot be referenced from the unit-test build of this crate.
