//! Orchestration metrics.

use chrono::{DateTime, Utc};
use concord_domain::AgentId;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Counters and gauges maintained by the orchestrator.
///
/// Counters are monotonic and `completed_tasks + failed_tasks` never
/// exceeds `total_tasks`. The average task duration is an exponential
/// moving average: the first sample initializes it, every later sample
/// folds in as `avg ← 0.9·avg + 0.1·sample`.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationMetrics {
    /// Tasks submitted
    pub total_tasks: u64,
    /// Tasks that reached a terminal, non-failed state
    pub completed_tasks: u64,
    /// Tasks that failed
    pub failed_tasks: u64,
    /// EMA of task duration in milliseconds
    pub avg_task_duration_ms: f64,
    /// Review rounds run
    pub review_rounds: u64,
    /// Review rounds whose decision was not `no_consensus`
    pub consensus_reached: u64,
    /// Review rounds that detected at least one conflict
    pub conflicted_rounds: u64,
    /// Invocations per agent id
    pub agent_utilization: HashMap<String, u64>,
    /// Last time any field changed
    pub last_updated: DateTime<Utc>,
}

impl Default for OrchestrationMetrics {
    fn default() -> Self {
        Self {
            total_tasks: 0,
            completed_tasks: 0,
            failed_tasks: 0,
            avg_task_duration_ms: 0.0,
            review_rounds: 0,
            consensus_reached: 0,
            conflicted_rounds: 0,
            agent_utilization: HashMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl OrchestrationMetrics {
    pub fn record_task_started(&mut self) {
        self.total_tasks += 1;
        self.touch();
    }

    pub fn record_task_completed(&mut self, duration: Duration) {
        self.completed_tasks += 1;
        let sample = duration.as_millis() as f64;
        self.avg_task_duration_ms = if self.completed_tasks == 1 {
            sample
        } else {
            0.9 * self.avg_task_duration_ms + 0.1 * sample
        };
        self.touch();
    }

    pub fn record_task_failed(&mut self) {
        self.failed_tasks += 1;
        self.touch();
    }

    pub fn record_review_round(&mut self, consensus_reached: bool, conflicted: bool) {
        self.review_rounds += 1;
        if consensus_reached {
            self.consensus_reached += 1;
        }
        if conflicted {
            self.conflicted_rounds += 1;
        }
        self.touch();
    }

    pub fn record_agent_use(&mut self, id: &AgentId) {
        *self
            .agent_utilization
            .entry(id.to_string())
            .or_default() += 1;
        self.touch();
    }

    /// Fraction of review rounds that reached a decision.
    pub fn consensus_rate(&self) -> f64 {
        if self.review_rounds == 0 {
            0.0
        } else {
            self.consensus_reached as f64 / self.review_rounds as f64
        }
    }

    /// Fraction of review rounds that detected conflicts.
    pub fn conflict_rate(&self) -> f64 {
        if self.review_rounds == 0 {
            0.0
        } else {
            self.conflicted_rounds as f64 / self.review_rounds as f64
        }
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}
