//! Testing utilities for the MRA workspace
//!
//! Scripted collaborator stubs, call recorders, and gates for exercising
//! cancellation timing deterministically.

#![allow(missing_docs)]

use async_trait::async_trait;
use mra_core::{
    AgentBackend, AgentRole, CollaboratorError, GatherOutcome, GeneratedCode, PlanStep, Planner,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Initialize test tracing once; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shorthand for a pending plan step.
pub fn step(id: &str, description: &str, role: AgentRole) -> PlanStep {
    PlanStep::new(id, description, role)
}

/// Rendezvous between a test and in-flight collaborator calls.
///
/// Each stubbed call to reach the gate announces itself and blocks until
/// the test calls `open`, one release per passage, so a test can inspect
/// state while a specific call is in flight. `disarm` releases the current
/// passage and lets every later one go straight through.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
    disarmed: AtomicBool,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wait until a stubbed call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the blocked call proceed.
    pub fn open(&self) {
        self.release.notify_one();
    }

    /// Release the blocked call and stop gating entirely.
    pub fn disarm(&self) {
        self.disarmed.store(true, Ordering::SeqCst);
        self.release.notify_one();
    }

    async fn pass(&self) {
        if self.disarmed.load(Ordering::SeqCst) {
            return;
        }
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// One recorded collaborator call.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// Trait method name (`"gather"`, `"analyze"`, ...)
    pub method: &'static str,
    pub description: String,
    pub context: String,
}

#[derive(Debug)]
struct Recorder {
    calls: Mutex<Vec<CallRecord>>,
}

impl Recorder {
    fn record(&self, method: &'static str, description: &str, context: &str) {
        self.calls.lock().unwrap().push(CallRecord {
            method,
            description: description.to_string(),
            context: context.to_string(),
        });
    }
}

/// Read side of a [`ScriptedAgents`] recorder, usable after the stub has
/// been moved into the controller.
#[derive(Clone)]
pub struct AgentsHandle {
    recorder: Arc<Recorder>,
}

impl AgentsHandle {
    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.recorder.calls.lock().unwrap().clone()
    }

    /// Contexts passed to every call of `method`, in order.
    pub fn contexts_for(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .map(|c| c.context)
            .collect()
    }

    /// Descriptions passed to every call of `method`, in order.
    pub fn descriptions_for(&self, method: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .map(|c| c.description)
            .collect()
    }
}

type Scripted<T> = Result<T, String>;

/// Scripted [`AgentBackend`] with canned responses, optional failures, a
/// call recorder and an optional gate applied to every call.
pub struct ScriptedAgents {
    gather: Scripted<GatherOutcome>,
    setup_env: Scripted<String>,
    generate_code: Scripted<GeneratedCode>,
    analyze: Scripted<String>,
    document: Scripted<String>,
    gate: Option<Arc<Gate>>,
    recorder: Arc<Recorder>,
}

impl ScriptedAgents {
    pub fn new() -> Self {
        Self {
            gather: Ok(GatherOutcome {
                code: "# arxiv query".to_string(),
                output: "papers".to_string(),
                is_generic: false,
            }),
            setup_env: Ok("environment ready".to_string()),
            generate_code: Ok(GeneratedCode {
                code: "print('hi')".to_string(),
                output: "hi".to_string(),
            }),
            analyze: Ok("insights".to_string()),
            document: Ok("report".to_string()),
            gate: None,
            recorder: Arc::new(Recorder {
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Read handle over the recorded calls.
    pub fn handle(&self) -> AgentsHandle {
        AgentsHandle {
            recorder: self.recorder.clone(),
        }
    }

    pub fn with_gather(mut self, code: &str, output: &str, is_generic: bool) -> Self {
        self.gather = Ok(GatherOutcome {
            code: code.to_string(),
            output: output.to_string(),
            is_generic,
        });
        self
    }

    pub fn with_gather_error(mut self, message: &str) -> Self {
        self.gather = Err(message.to_string());
        self
    }

    pub fn with_setup_env(mut self, config: &str) -> Self {
        self.setup_env = Ok(config.to_string());
        self
    }

    pub fn with_generate_code(mut self, code: &str, output: &str) -> Self {
        self.generate_code = Ok(GeneratedCode {
            code: code.to_string(),
            output: output.to_string(),
        });
        self
    }

    pub fn with_generate_code_error(mut self, message: &str) -> Self {
        self.generate_code = Err(message.to_string());
        self
    }

    pub fn with_analyze(mut self, insights: &str) -> Self {
        self.analyze = Ok(insights.to_string());
        self
    }

    pub fn with_document(mut self, report: &str) -> Self {
        self.document = Ok(report.to_string());
        self
    }

    /// Block every collaborator call on `gate` until the test opens it.
    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    async fn enter(&self) {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
    }

    fn scripted<T: Clone>(slot: &Scripted<T>) -> Result<T, CollaboratorError> {
        slot.clone().map_err(CollaboratorError::new)
    }
}

impl Default for ScriptedAgents {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentBackend for ScriptedAgents {
    async fn gather(&self, description: &str) -> Result<GatherOutcome, CollaboratorError> {
        self.recorder.record("gather", description, "");
        self.enter().await;
        Self::scripted(&self.gather)
    }

    async fn setup_env(
        &self,
        description: &str,
        context: &str,
    ) -> Result<String, CollaboratorError> {
        self.recorder.record("setup_env", description, context);
        self.enter().await;
        Self::scripted(&self.setup_env)
    }

    async fn generate_code(
        &self,
        description: &str,
        context: &str,
    ) -> Result<GeneratedCode, CollaboratorError> {
        self.recorder.record("generate_code", description, context);
        self.enter().await;
        Self::scripted(&self.generate_code)
    }

    async fn analyze(
        &self,
        description: &str,
        context: &str,
    ) -> Result<String, CollaboratorError> {
        self.recorder.record("analyze", description, context);
        self.enter().await;
        Self::scripted(&self.analyze)
    }

    async fn document(
        &self,
        description: &str,
        context: &str,
    ) -> Result<String, CollaboratorError> {
        self.recorder.record("document", description, context);
        self.enter().await;
        Self::scripted(&self.document)
    }
}

/// Scripted [`Planner`] returning a fixed plan, an error, or blocking on a
/// gate before resolving.
pub struct ScriptedPlanner {
    plan: Result<Vec<PlanStep>, String>,
    gate: Option<Arc<Gate>>,
}

impl ScriptedPlanner {
    pub fn new(plan: Vec<PlanStep>) -> Self {
        Self {
            plan: Ok(plan),
            gate: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            plan: Err(message.to_string()),
            gate: None,
        }
    }

    /// Block plan generation on `gate` until the test opens it.
    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn generate_plan(&self, _goal: &str) -> Result<Vec<PlanStep>, CollaboratorError> {
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.plan.clone().map_err(CollaboratorError::new)
    }
}
