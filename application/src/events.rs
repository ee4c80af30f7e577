//! Orchestration event stream.
//!
//! A best-effort, ordered, lossy stream of lifecycle events. The buffer is
//! bounded (100 events) with DROP-NEWEST-ON-FULL semantics: when no one
//! drains the channel fast enough, new events are silently discarded rather
//! than ever blocking a producer. Dropped events increment no metric.

use chrono::{DateTime, Utc};
use concord_domain::{AgentId, ProposalId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Capacity of the bounded event buffer.
pub const EVENT_BUFFER_SIZE: usize = 100;

/// Lifecycle event kinds emitted by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskStarted,
    TaskCompleted,
    TaskFailed,
    ReviewStarted,
    ReviewCompleted,
    ConsensusReached,
    ConflictDetected,
}

/// A timestamped observability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationEvent {
    /// What happened
    pub kind: EventKind,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// The task involved, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// The agent involved, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    /// The proposal involved, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<ProposalId>,
    /// Free-form string-keyed details
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl OrchestrationEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            task_id: None,
            agent_id: None,
            proposal_id: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn with_proposal(mut self, proposal_id: ProposalId) -> Self {
        self.proposal_id = Some(proposal_id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Bounded MPSC event channel with non-blocking send.
pub struct EventBus {
    tx: mpsc::Sender<OrchestrationEvent>,
    rx: Mutex<Option<mpsc::Receiver<OrchestrationEvent>>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Publish an event without ever blocking.
    ///
    /// A full buffer drops the new event; a closed channel (consumer gone)
    /// drops it too. Either way the producer continues untouched.
    pub fn emit(&self, event: OrchestrationEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!("Event buffer full, dropping {:?}", event.kind);
            }
            Err(TrySendError::Closed(event)) => {
                debug!("Event consumer gone, dropping {:?}", event.kind);
            }
        }
    }

    /// Claim the single receiver. Returns `None` once taken.
    pub fn subscribe(&self) -> Option<mpsc::Receiver<OrchestrationEvent>> {
        self.rx.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder() {
        let event = OrchestrationEvent::new(EventKind::TaskStarted)
            .with_task("t-1".into())
            .with_agent("lead-1".into())
            .with_metadata("priority", "high");

        assert_eq!(event.kind, EventKind::TaskStarted);
        assert_eq!(event.task_id.as_ref().unwrap().as_str(), "t-1");
        assert_eq!(event.metadata.get("priority").unwrap(), "high");
    }

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe().unwrap();

        bus.emit(OrchestrationEvent::new(EventKind::TaskStarted));
        bus.emit(OrchestrationEvent::new(EventKind::TaskCompleted));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskStarted);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskCompleted);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_newest() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe().unwrap();

        bus.emit(OrchestrationEvent::new(EventKind::TaskStarted));
        bus.emit(OrchestrationEvent::new(EventKind::ReviewStarted));
        // buffer full: this one is dropped, not the queued ones
        bus.emit(OrchestrationEvent::new(EventKind::TaskCompleted));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TaskStarted);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ReviewStarted);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscribe_is_single_consumer() {
        let bus = EventBus::new(2);
        assert!(bus.subscribe().is_some());
        assert!(bus.subscribe().is_none());
    }

    #[test]
    fn test_emit_after_consumer_dropped_does_not_panic() {
        let bus = EventBus::new(2);
        let rx = bus.subscribe().unwrap();
        drop(rx);
        bus.emit(OrchestrationEvent::new(EventKind::TaskFailed));
    }
}
