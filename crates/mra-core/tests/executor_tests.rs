//! Plan executor tests
//!
//! Live in the integration-test tree because they drive the executor
//! through `mra_test_utils::ScriptedAgents`, which links against the
//! `mra-core` library crate.

use mra_core::state::{RunState, StateHandle};
use mra_core::types::{AgentRole, PlanStep, StepStatus, WorkflowConfig};
use mra_core::{PlanExecutor, StepDispatcher};
use mra_test_utils::ScriptedAgents;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

fn executor_for(plan: Vec<PlanStep>) -> (PlanExecutor, StateHandle) {
    let mut run_state = RunState::new();
    run_state.is_processing = true;
    run_state.set_plan(plan);
    let state: StateHandle = Arc::new(RwLock::new(run_state));
    let config = WorkflowConfig::new().with_pre_step_delay(Duration::ZERO);
    let dispatcher =
        StepDispatcher::new(state.clone(), Arc::new(ScriptedAgents::new()), config);
    (PlanExecutor::new(state.clone(), dispatcher), state)
}

#[tokio::test]
async fn pre_cancelled_token_touches_nothing() {
    let (executor, state) = executor_for(vec![
        PlanStep::new("s1", "gather", AgentRole::DataGatherer),
        PlanStep::new("s2", "document", AgentRole::Documentation),
    ]);

    let token = CancellationToken::new();
    token.cancel();
    executor.run("G", &token).await;

    let state = state.read().await;
    assert!(state
        .plan
        .iter()
        .all(|s| s.status == StepStatus::Pending));
    let aborts: Vec<_> = state
        .logs
        .entries()
        .iter()
        .filter(|e| e.content == "Workflow execution aborted.")
        .collect();
    assert_eq!(aborts.len(), 1);
    assert!(state.current_step_id.is_none());
}

#[tokio::test]
async fn empty_plan_still_finishes() {
    let (executor, state) = executor_for(vec![]);

    executor.run("G", &CancellationToken::new()).await;

    let state = state.read().await;
    assert!(!state.is_processing);
    let last = state.logs.entries().last().unwrap();
    assert_eq!(
        last.content,
        "All tasks completed successfully. Protocol finished."
    );
    assert_eq!(last.agent_role, Some(AgentRole::Manager));
}

#[tokio::test]
async fn completed_steps_record_output() {
    let (executor, state) = executor_for(vec![PlanStep::new(
        "s1",
        "write up",
        AgentRole::Documentation,
    )]);

    executor.run("G", &CancellationToken::new()).await;

    let state = state.read().await;
    let step = &state.plan[0];
    assert_eq!(step.status, StepStatus::Completed);
    assert_eq!(step.output.as_deref(), Some("report"));
}
