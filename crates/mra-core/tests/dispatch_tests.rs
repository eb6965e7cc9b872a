//! Step dispatcher tests
//!
//! Live in the integration-test tree because they drive the dispatcher
//! through `mra_test_utils::ScriptedAgents`, which links against the
//! `mra-core` library crate.

use mra_core::state::{RunState, StateHandle};
use mra_core::store::{ArtifactKind, LogRole};
use mra_core::types::{AgentRole, PlanStep, WorkflowConfig};
use mra_core::StepDispatcher;
use mra_test_utils::ScriptedAgents;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

fn dispatcher(agents: ScriptedAgents) -> (StepDispatcher, StateHandle) {
    let state: StateHandle = Arc::new(RwLock::new(RunState::new()));
    let config = WorkflowConfig::new().with_pre_step_delay(Duration::ZERO);
    let dispatcher = StepDispatcher::new(state.clone(), Arc::new(agents), config);
    (dispatcher, state)
}

#[tokio::test]
async fn data_gatherer_appends_script_and_findings() {
    let agents = ScriptedAgents::new().with_gather("# search", "papers found", false);
    let (dispatcher, state) = dispatcher(agents);
    let step = PlanStep::new("s1", "find papers", AgentRole::DataGatherer);

    let result = dispatcher.execute(&step, "ctx").await;

    assert_eq!(result, "papers found");
    let state = state.read().await;
    let script = state.artifacts.first_of(ArtifactKind::Code).unwrap();
    assert_eq!(script.title, "ArXiv Search Script");
    assert_eq!(script.language.as_deref(), Some("python"));
    let data = state.artifacts.first_of(ArtifactKind::Data).unwrap();
    assert_eq!(data.content, "papers found");
    // Narration + agent result entries
    assert!(state
        .logs
        .entries()
        .iter()
        .any(|e| e.content.contains("Executing ArXiv search script")));
    let last = state.logs.entries().last().unwrap();
    assert_eq!(last.role, LogRole::Agent);
    assert_eq!(last.agent_role, Some(AgentRole::DataGatherer));
}

#[tokio::test]
async fn data_gatherer_warns_on_generic_fallback() {
    let agents = ScriptedAgents::new().with_gather("# search", "generic", true);
    let (dispatcher, state) = dispatcher(agents);
    let step = PlanStep::new("s1", "find papers", AgentRole::DataGatherer);

    dispatcher.execute(&step, "ctx").await;

    let state = state.read().await;
    assert!(state
        .logs
        .entries()
        .iter()
        .any(|e| e.content.starts_with("Warning: ArXiv search failed")));
}

#[tokio::test]
async fn code_generator_fills_side_channel_and_previews() {
    let agents = ScriptedAgents::new().with_generate_code("print(42)", "42");
    let (dispatcher, state) = dispatcher(agents);
    let step = PlanStep::new("s1", "run analysis", AgentRole::CodeGenerator);

    let result = dispatcher.execute(&step, "ctx").await;

    assert_eq!(result, "Code Generated and Executed.\nOutput Preview:\n42...");
    let state = state.read().await;
    assert_eq!(state.execution_output.as_deref(), Some("42"));
    let script = state.artifacts.first_of(ArtifactKind::Code).unwrap();
    assert_eq!(script.title, "Analysis Script");
}

#[tokio::test]
async fn preview_is_bounded() {
    let long_output = "x".repeat(500);
    let agents = ScriptedAgents::new().with_generate_code("code", &long_output);
    let (dispatcher, _state) = dispatcher(agents);
    let step = PlanStep::new("s1", "run analysis", AgentRole::CodeGenerator);

    let result = dispatcher.execute(&step, "ctx").await;

    let preview_line = result.lines().last().unwrap();
    // 200 chars of output plus the trailing ellipsis
    assert_eq!(preview_line.len(), 203);
    assert!(preview_line.ends_with("..."));
}

#[tokio::test]
async fn analyzer_reads_side_channel_when_present() {
    let agents = ScriptedAgents::new();
    let (dispatcher, state) = dispatcher(agents);
    state.write().await.execution_output = Some("42".to_string());
    let step = PlanStep::new("s1", "interpret", AgentRole::ResultAnalyzer);

    dispatcher.execute(&step, "the context").await;

    let state = state.read().await;
    assert!(state.artifacts.first_of(ArtifactKind::Analysis).is_some());
}

#[tokio::test]
async fn analyzer_contexts_are_composed_correctly() {
    let agents = ScriptedAgents::new();
    let handle = agents.handle();
    let (dispatcher, state) = dispatcher(agents);
    let step = PlanStep::new("s1", "interpret", AgentRole::ResultAnalyzer);

    // No side-channel value: fallback preamble
    dispatcher.execute(&step, "CTX").await;
    // With side-channel value: actual output preamble
    state.write().await.execution_output = Some("42".to_string());
    let step2 = PlanStep::new("s2", "interpret again", AgentRole::ResultAnalyzer);
    dispatcher.execute(&step2, "CTX").await;

    let contexts = handle.contexts_for("analyze");
    assert!(contexts[0].contains("execution output is missing"));
    assert!(contexts[0].ends_with("\n\nCTX"));
    assert!(contexts[1].contains("Actual Execution Output:\n42"));
    assert!(contexts[1].ends_with("\n\nCTX"));
}

#[tokio::test]
async fn env_setup_and_documentation_append_artifacts() {
    let agents = ScriptedAgents::new()
        .with_setup_env("conda env")
        .with_document("the report");
    let (dispatcher, state) = dispatcher(agents);

    let env = PlanStep::new("s1", "set up", AgentRole::EnvSetup);
    let doc = PlanStep::new("s2", "write up", AgentRole::Documentation);
    let env_result = dispatcher.execute(&env, "ctx").await;
    let doc_result = dispatcher.execute(&doc, "ctx").await;

    assert_eq!(env_result, "conda env");
    assert_eq!(doc_result, "the report");
    let state = state.read().await;
    assert_eq!(
        state.artifacts.first_of(ArtifactKind::Env).unwrap().title,
        "Environment Config"
    );
    assert_eq!(
        state.artifacts.first_of(ArtifactKind::Doc).unwrap().title,
        "Final Report"
    );
}

#[tokio::test]
async fn unhandled_roles_complete_with_fixed_message() {
    let (dispatcher, state) = dispatcher(ScriptedAgents::new());
    let step = PlanStep::new("s1", "oversee", AgentRole::Manager);

    let result = dispatcher.execute(&step, "ctx").await;

    assert_eq!(result, "Task completed.");
    let state = state.read().await;
    assert!(state.artifacts.is_empty());
    assert_eq!(state.logs.len(), 1); // just the agent result entry
}

#[tokio::test]
async fn collaborator_failure_is_contained() {
    let agents = ScriptedAgents::new().with_generate_code_error("boom");
    let (dispatcher, state) = dispatcher(agents);
    let step = PlanStep::new("s1", "run analysis", AgentRole::CodeGenerator);

    let result = dispatcher.execute(&step, "ctx").await;

    assert_eq!(result, "Error: boom");
    let state = state.read().await;
    assert!(state
        .logs
        .entries()
        .iter()
        .any(|e| e.role == LogRole::System && e.content == "Error executing step: boom"));
    // The failing call produced no agent entry and no artifacts
    assert!(!state.logs.entries().iter().any(|e| e.role == LogRole::Agent));
    assert!(state.artifacts.first_of(ArtifactKind::Code).is_none());
    // Side-channel untouched
    assert!(state.execution_output.is_none());
}
