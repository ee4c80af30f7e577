//! Orchestration result types.

use crate::agent::result::{AgentResult, ResultStatus};
use crate::consensus::result::ConsensusResult;
use crate::core::time::current_timestamp;
use crate::task::value_objects::TaskId;
use serde::{Deserialize, Serialize};

/// Terminal outcome of one `execute_task` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// The task that was executed
    pub task_id: TaskId,
    /// Terminal status of the orchestration
    pub status: ResultStatus,
    /// One consensus result per reviewed proposal, in proposal order
    pub consensus: Vec<ConsensusResult>,
    /// The lead result, when the task succeeded or a proposal was approved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_result: Option<AgentResult>,
    /// Total wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Diagnostic from the first failed sub-result, when the task failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Completion timestamp (milliseconds since epoch)
    pub timestamp: u64,
}

impl OrchestrationResult {
    /// A task that reached a terminal, non-failed state.
    pub fn completed(
        task_id: TaskId,
        status: ResultStatus,
        consensus: Vec<ConsensusResult>,
        final_result: Option<AgentResult>,
        duration_ms: u64,
    ) -> Self {
        Self {
            task_id,
            status,
            consensus,
            final_result,
            duration_ms,
            error: None,
            timestamp: current_timestamp(),
        }
    }

    /// A task that failed; carries the first failure diagnostic.
    pub fn failed(task_id: TaskId, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            task_id,
            status: ResultStatus::Failed,
            consensus: Vec::new(),
            final_result: None,
            duration_ms,
            error: Some(error.into()),
            timestamp: current_timestamp(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ResultStatus::Success)
    }

    /// The consensus results whose decision approved a proposal.
    pub fn approvals(&self) -> impl Iterator<Item = &ConsensusResult> {
        self.consensus.iter().filter(|c| c.is_approved())
    }
}
