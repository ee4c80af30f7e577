//! Sandbox port
//!
//! Defines the interface for executing code and test commands in isolation.
//! Reviewers with the testing capability use it to validate a proposal's
//! test cases; the core itself never spawns a process.

use async_trait::async_trait;
use concord_domain::proposal::entities::Change;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during sandboxed execution
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Sandbox unavailable: {0}")]
    Unavailable(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,
}

/// One command the sandbox should run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationStep {
    /// Step name
    pub name: String,
    /// Command to execute
    pub command: String,
    /// Command arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Whether a failure of this step fails the whole request
    pub required: bool,
    /// What the step validates
    pub description: String,
}

impl ValidationStep {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            required: true,
            description: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A request to execute validation steps against a set of file changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Request identifier (usually the proposal id)
    pub id: String,
    /// What kind of validation this is (e.g., "test", "lint")
    pub kind: String,
    /// Commands to run, in order
    pub validation_steps: Vec<ValidationStep>,
    /// File changes to apply before running, when any
    #[serde(default)]
    pub file_changes: Vec<Change>,
}

impl ExecutionRequest {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            validation_steps: Vec::new(),
            file_changes: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: ValidationStep) -> Self {
        self.validation_steps.push(step);
        self
    }

    pub fn with_file_changes(mut self, changes: Vec<Change>) -> Self {
        self.file_changes = changes;
        self
    }
}

/// Overall outcome of an execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Every required step passed
    Success,
    /// At least one required step failed
    Failure,
    /// The sandbox could not run the request to completion
    Error,
}

/// Outcome of one executed command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// The command that ran
    pub command: String,
    /// Its exit code
    pub exit_code: i32,
    /// Captured stdout/stderr
    pub output: String,
    /// Sandbox-level error for this command, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response to an execution request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResponse {
    /// Overall outcome
    pub status: ExecutionStatus,
    /// Per-command outcomes, in step order
    pub results: Vec<CommandResult>,
    /// Total wall-clock time in milliseconds
    pub duration_ms: u64,
    /// Resulting diff, when the sandbox applied changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Isolated execution of code and test commands.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn execute_code(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResponse, SandboxError>;
}
