//! Application layer for concord
//!
//! This crate drives the multi-agent consensus flow: built-in lead and
//! reviewer agents, the registry and factory that manage them, the parallel
//! review dispatcher, and the orchestrator that ties task execution, review
//! rounds, events, and metrics together. Model backends and sandboxes are
//! reached exclusively through the ports in [`ports`].

pub mod agents;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod metrics;
pub mod orchestrator;
pub mod ports;
pub mod registry;

// Re-export the public surface
pub use agents::{Agent, factory::AgentFactory, lead::LeadAgent, reviewer::ReviewerAgent};
pub use config::{AgentProfile, OrchestrationConfig};
pub use dispatch::ReviewDispatcher;
pub use error::{ConfigError, InputError, OrchestrationError};
pub use events::{EventBus, EventKind, OrchestrationEvent};
pub use metrics::OrchestrationMetrics;
pub use orchestrator::Orchestrator;
pub use ports::prompt_runner::{
    PromptOutput, PromptRequest, PromptRunner, RunnerError, RunnerGateway,
};
pub use ports::sandbox::{
    CommandResult, ExecutionRequest, ExecutionResponse, ExecutionStatus, Sandbox, SandboxError,
    ValidationStep,
};
pub use registry::AgentRegistry;
