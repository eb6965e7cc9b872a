//! MRA Core - Materials Research Assistant orchestrator
//!
//! A sequential, resumable, cancellable workflow pipeline that:
//! - Obtains an ordered plan of typed steps from a planning collaborator
//! - Routes each step to one of a closed set of agent handlers
//! - Accumulates cross-step textual context plus one execution side-channel
//! - Materializes artifacts and transcript entries as side effects
//!
//! # Example
//!
//! ```rust,ignore
//! use mra_core::{WorkflowController, WorkflowConfig};
//! use std::sync::Arc;
//!
//! # async fn example(planner: Arc<dyn mra_core::Planner>, agents: Arc<dyn mra_core::AgentBackend>) {
//! let controller = WorkflowController::new(planner, agents);
//! controller.start("Survey perovskite solar cell stability").await;
//!
//! let snapshot = controller.snapshot().await;
//! println!("{} artifacts produced", snapshot.artifacts.len());
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod collaborators;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod state;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use collaborators::{AgentBackend, GatherOutcome, GeneratedCode, Planner};
pub use controller::WorkflowController;
pub use dispatch::StepDispatcher;
pub use error::{CollaboratorError, StateError};
pub use executor::PlanExecutor;
pub use state::{RunSnapshot, RunState, StateHandle};
pub use store::{Artifact, ArtifactKind, ArtifactStore, LogEntry, LogId, LogRole, LogStore};
pub use types::{AgentRole, PlanStep, StepId, StepStatus, WorkflowConfig};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the MRA core
    pub use crate::{
        AgentBackend, AgentRole, Artifact, ArtifactKind, CollaboratorError, GatherOutcome,
        GeneratedCode, LogEntry, LogRole, PlanStep, Planner, RunSnapshot, StepId, StepStatus,
        WorkflowConfig, WorkflowController,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
