//! Run controller: top-level entry points for one workflow run
//!
//! `start` resets state wholesale, obtains a plan from the planning
//! collaborator and hands off to the executor; `stop` signals the current
//! run's cancellation token. The controller is cheap to clone - all fields
//! are shared handles - so the presentation layer can hold one clone for
//! reads and another for control.

use crate::collaborators::{AgentBackend, Planner};
use crate::dispatch::StepDispatcher;
use crate::executor::PlanExecutor;
use crate::state::{RunSnapshot, RunState, StateHandle};
use crate::store::{LogEntry, LogRole};
use crate::types::WorkflowConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Orchestrates workflow runs over shared run state
///
/// Exactly one run is in flight at a time: starting a new run signals the
/// previous run's token and waits for that run to exit before resetting
/// state, so a superseded run can never mutate fresh state.
#[derive(Clone)]
pub struct WorkflowController {
    state: StateHandle,
    planner: Arc<dyn Planner>,
    agents: Arc<dyn AgentBackend>,
    config: WorkflowConfig,
    /// Current run's cancellation token, replaced on every `start`
    cancel: Arc<Mutex<CancellationToken>>,
    /// Held for the duration of a run; serializes successive runs
    run_guard: Arc<AsyncMutex<()>>,
}

impl WorkflowController {
    /// Create a controller with default configuration
    #[inline]
    #[must_use]
    pub fn new(planner: Arc<dyn Planner>, agents: Arc<dyn AgentBackend>) -> Self {
        Self::with_config(planner, agents, WorkflowConfig::default())
    }

    /// Create a controller with explicit configuration
    #[must_use]
    pub fn with_config(
        planner: Arc<dyn Planner>,
        agents: Arc<dyn AgentBackend>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(RunState::new())),
            planner,
            agents,
            config,
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            run_guard: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Start a workflow run for the given goal
    ///
    /// Cancels and awaits any run still in flight, resets all run state,
    /// requests a plan and executes it. Runs to completion or cancellation;
    /// plan-generation failure ends the run with an empty plan and a
    /// `system` transcript entry.
    pub async fn start(&self, goal: &str) {
        // Supersede the previous run: signal its token, then wait for it
        // to release the guard before touching state.
        self.cancel.lock().cancel();
        let _run = self.run_guard.lock().await;

        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();

        {
            let mut state = self.state.write().await;
            *state = RunState::new();
            state.is_processing = true;
            state.log(LogRole::User, goal, None);
        }
        tracing::info!(goal, "workflow run started");

        let plan = match self.planner.generate_plan(goal).await {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(error = %err, "plan generation failed");
                let mut state = self.state.write().await;
                state.log(LogRole::System, format!("Workflow failed: {err}"), None);
                state.is_processing = false;
                return;
            }
        };

        // Stopped while planning: never begin execution.
        if token.is_cancelled() {
            tracing::info!("run cancelled during planning");
            return;
        }

        self.state.write().await.set_plan(plan);

        let dispatcher = StepDispatcher::new(
            self.state.clone(),
            self.agents.clone(),
            self.config.clone(),
        );
        let executor = PlanExecutor::new(self.state.clone(), dispatcher);
        executor.run(goal, &token).await;
    }

    /// Stop the current run
    ///
    /// Signals the cancellation token and marks the run stopped
    /// immediately; an in-flight collaborator call is not interrupted, but
    /// no further step will begin.
    pub async fn stop(&self) {
        self.cancel.lock().cancel();
        tracing::info!("workflow stop requested");

        let mut state = self.state.write().await;
        state.log(LogRole::System, "Workflow stopped by user.", None);
        state.is_processing = false;
        state.current_step_id = None;
    }

    /// Read-only snapshot of the full run state
    #[must_use]
    pub async fn snapshot(&self) -> RunSnapshot {
        self.state.read().await.snapshot()
    }

    /// Trailing window of recent transcript entries
    #[must_use]
    pub async fn recent_logs(&self) -> Vec<LogEntry> {
        self.state.read().await.logs.tail(self.config.log_window).to_vec()
    }

    /// Current execution side-channel value, for display only
    #[must_use]
    pub async fn execution_output(&self) -> Option<String> {
        self.state.read().await.execution_output.clone()
    }

    /// Whether a run is currently in flight
    #[must_use]
    pub async fn is_processing(&self) -> bool {
        self.state.read().await.is_processing
    }

    /// Shared handle to the run state
    ///
    /// Intended for embedding the controller in a larger runtime; readers
    /// outside the core must treat it as read-only.
    #[inline]
    #[must_use]
    pub fn state(&self) -> StateHandle {
        self.state.clone()
    }
}
