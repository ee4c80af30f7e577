//! Application error taxonomy.
//!
//! Errors are grouped by cause: configuration invariants, caller input,
//! model-backend failures, and sandbox failures. Sandbox errors are
//! non-fatal at the orchestrator level (they degrade the affected test
//! report); everything else propagates through [`OrchestrationError`].

use crate::ports::prompt_runner::RunnerError;
use crate::ports::sandbox::SandboxError;
use concord_domain::core::error::DomainError;
use concord_domain::{AgentId, TaskKind};
use std::time::Duration;
use thiserror::Error;

/// Violated configuration invariants, fatal before use.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max_agents must be positive")]
    InvalidMaxAgents,

    #[error("consensus_threshold {0} outside [0, 1]")]
    InvalidThreshold(f64),

    #[error("{0} must be positive")]
    InvalidTimeout(&'static str),

    #[error("quality_gate.min_confidence {0} outside [0, 1]")]
    InvalidMinConfidence(f64),

    #[error("quality_gate.min_reviewers {min} exceeds max_reviewers {max}")]
    ReviewerBoundsInverted { min: usize, max: usize },

    #[error("Agent profile '{0}' has no model reference")]
    MissingModel(String),

    #[error("Expert profile '{0}' requires a specialization")]
    MissingSpecialization(String),

    #[error("No enabled lead profile in configuration")]
    NoLeadProfile,

    #[error("No lead agent registered")]
    NoLeadAgent,

    #[error("Agent registry is full ({0} agents)")]
    AgentLimitReached(usize),

    #[error("Insufficient reviewers: {found} available, {required} required")]
    InsufficientReviewers { found: usize, required: usize },
}

/// Bad caller input, rejected without state change.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(AgentId),

    #[error("Task kind '{kind}' is not supported by reviewer agent '{agent}'")]
    TaskKindNotSupported { kind: TaskKind, agent: AgentId },

    #[error("Malformed task: {0}")]
    MalformedTask(#[from] DomainError),
}

/// Umbrella error for the orchestration flow.
#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Model error: {0}")]
    Model(#[from] RunnerError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

impl OrchestrationError {
    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrchestrationError::Cancelled)
    }
}
