//! Agent invocation results.

use super::value_objects::AgentId;
use crate::core::time::current_timestamp;
use crate::proposal::entities::Proposal;
use crate::task::value_objects::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terminal status of an agent invocation or of a whole orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// The work completed as asked
    Success,
    /// Some of the work completed
    Partial,
    /// The work failed
    Failed,
    /// The work was cut short (timeout, cancellation)
    Incomplete,
}

impl ResultStatus {
    /// Returns the status as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            ResultStatus::Success => "success",
            ResultStatus::Partial => "partial",
            ResultStatus::Failed => "failed",
            ResultStatus::Incomplete => "incomplete",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ResultStatus::Failed)
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a non-proposal artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Free-form analysis text
    Analysis,
    /// Structured report
    Report,
    /// A unified diff
    Diff,
    /// Captured output
    Log,
}

/// Side output of an agent invocation that is not a proposal.
///
/// Reviewers asked to `analyze` return their findings this way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact name
    pub name: String,
    /// What the content is
    pub kind: ArtifactKind,
    /// Artifact content
    pub content: String,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, kind: ArtifactKind, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The outcome of one agent invocation on a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// The task that was executed
    pub task_id: TaskId,
    /// The agent that produced this result
    pub agent: AgentId,
    /// Terminal status
    pub status: ResultStatus,
    /// Proposals produced (leads); empty for analysis-only work
    pub proposals: Vec<Proposal>,
    /// Non-proposal outputs
    pub artifacts: Vec<Artifact>,
    /// The agent's reasoning about its output
    pub reasoning: String,
    /// Self-reported confidence in [0, 1]
    pub confidence: f64,
    /// Wall-clock duration of the invocation in milliseconds
    pub duration_ms: u64,
    /// Completion timestamp (milliseconds since epoch)
    pub timestamp: u64,
    /// Error message when the invocation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    /// Creates a successful result.
    pub fn success(task_id: TaskId, agent: AgentId) -> Self {
        Self {
            task_id,
            agent,
            status: ResultStatus::Success,
            proposals: Vec::new(),
            artifacts: Vec::new(),
            reasoning: String::new(),
            confidence: 0.0,
            duration_ms: 0,
            timestamp: current_timestamp(),
            error: None,
        }
    }

    /// Creates a failed result carrying a diagnostic message.
    pub fn failed(task_id: TaskId, agent: AgentId, error: impl Into<String>) -> Self {
        Self {
            task_id,
            agent,
            status: ResultStatus::Failed,
            proposals: Vec::new(),
            artifacts: Vec::new(),
            reasoning: String::new(),
            confidence: 0.0,
            duration_ms: 0,
            timestamp: current_timestamp(),
            error: Some(error.into()),
        }
    }

    pub fn with_proposals(mut self, proposals: Vec<Proposal>) -> Self {
        self.proposals = proposals;
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ResultStatus::Success)
    }
}
