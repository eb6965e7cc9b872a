//! Core types for the MRA orchestrator
//!
//! Defines the fundamental types for a workflow run:
//! - Step identifiers and the closed set of agent roles
//! - Plan steps and their status lifecycle
//! - Orchestrator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque unique step identifier, allocated by the planning collaborator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepId(pub String);

impl StepId {
    /// Create a step id from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The closed set of agent roles a step can be routed to
///
/// Each non-planner/manager role maps 1:1 to a dispatcher handler.
/// The canonical names (`DATA_GATHERER`, ...) appear verbatim in context
/// labels and serialized snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    /// Produces the plan (never dispatched to a handler)
    Planner,
    /// Oversees the run; attributed on the completion log
    Manager,
    /// Literature/data retrieval
    DataGatherer,
    /// Environment configuration
    EnvSetup,
    /// Analysis code generation and execution
    CodeGenerator,
    /// Interpretation of execution results
    ResultAnalyzer,
    /// Final report writing
    Documentation,
}

impl AgentRole {
    /// Canonical role name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Planner => "PLANNER",
            AgentRole::Manager => "MANAGER",
            AgentRole::DataGatherer => "DATA_GATHERER",
            AgentRole::EnvSetup => "ENV_SETUP",
            AgentRole::CodeGenerator => "CODE_GENERATOR",
            AgentRole::ResultAnalyzer => "RESULT_ANALYZER",
            AgentRole::Documentation => "DOCUMENTATION",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step status lifecycle
///
/// Strictly `Pending -> Running -> {Completed, Failed}`. A step never
/// reverts and is never re-entered; terminal states have no successors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Created, not yet reached by the executor
    Pending,
    /// Currently being dispatched
    Running,
    /// Dispatch finished (including contained dispatch errors)
    Completed,
    /// Abandoned mid-flight by cancellation
    Failed,
}

impl StepStatus {
    /// States this status may legally transition to
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [StepStatus] {
        use StepStatus::*;
        match self {
            Pending => &[Running],
            Running => &[Completed, Failed],
            Completed => &[],
            Failed => &[],
        }
    }

    /// Whether a transition to `next` is legal
    #[inline]
    #[must_use]
    pub fn can_advance_to(self, next: StepStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Whether this status is terminal
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// One unit of work in a plan, assigned to a single agent role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Opaque unique identifier
    pub id: StepId,
    /// What the step should accomplish
    pub description: String,
    /// Role the dispatcher routes this step to
    #[serde(rename = "assignedAgent")]
    pub assigned_agent: AgentRole,
    /// Lifecycle status, mutated only by the plan executor
    pub status: StepStatus,
    /// Result text recorded when the step completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl PlanStep {
    /// Create a pending step
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<StepId>, description: impl Into<String>, role: AgentRole) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            assigned_agent: role,
            status: StepStatus::Pending,
            output: None,
        }
    }
}

/// Orchestrator configuration
///
/// Defaults match the observed behavior of the reference assistant: a one
/// second artificial pre-step delay, a 50-entry trailing log window and a
/// 200-character execution output preview.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Fixed artificial delay before each step is dispatched
    pub pre_step_delay: Duration,
    /// Size of the trailing log window exposed to readers
    pub log_window: usize,
    /// Characters of execution output echoed into the rolling context
    pub preview_chars: usize,
}

impl WorkflowConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With pre-step delay
    #[inline]
    #[must_use]
    pub fn with_pre_step_delay(mut self, delay: Duration) -> Self {
        self.pre_step_delay = delay;
        self
    }

    /// With trailing log window size
    #[inline]
    #[must_use]
    pub fn with_log_window(mut self, window: usize) -> Self {
        self.log_window = window;
        self
    }

    /// With execution output preview length
    #[inline]
    #[must_use]
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pre_step_delay: Duration::from_secs(1),
            log_window: 50,
            preview_chars: 200,
        }
    }
}
