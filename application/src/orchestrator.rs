//! Orchestrator - owns the task lifecycle and composes the core.
//!
//! The orchestrator routes a task to a lead agent, fans each resulting
//! proposal out to a reviewer quorum, reduces the collected reviews to a
//! consensus, and keeps the event stream and metrics current throughout.
//!
//! # Locking discipline
//!
//! The agent registry and the metrics live behind one reader-writer lock.
//! Reads take shared mode, writes take exclusive mode, and no lock is ever
//! held across a port call: agent lists are snapshotted out first, then the
//! lock is released before any model or sandbox work starts.

use crate::agents::Agent;
use crate::config::OrchestrationConfig;
use crate::dispatch::ReviewDispatcher;
use crate::error::{ConfigError, InputError, OrchestrationError};
use crate::events::{EventBus, EventKind, OrchestrationEvent};
use crate::metrics::OrchestrationMetrics;
use crate::ports::prompt_runner::RunnerGateway;
use crate::registry::AgentRegistry;
use concord_domain::consensus::engine::{evaluate, resolve_conflicts};
use concord_domain::{
    AgentId, AgentResult, AgentRole, ConsensusResult, OrchestrationResult, Proposal, ResultStatus,
    Task,
};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Registry and metrics, guarded together by one lock.
struct OrchestratorState {
    registry: AgentRegistry,
    metrics: OrchestrationMetrics,
}

/// The multi-agent task orchestrator.
///
/// Thread-safe: concurrent `execute_task` and `review_proposal` calls are
/// supported. Construct with a validated [`OrchestrationConfig`], register
/// agents (or [`bootstrap`](Orchestrator::bootstrap) them from profiles),
/// then submit tasks.
pub struct Orchestrator {
    config: OrchestrationConfig,
    state: RwLock<OrchestratorState>,
    events: EventBus,
    dispatcher: ReviewDispatcher,
    cancellation: Option<CancellationToken>,
    shutdown: CancellationToken,
    consumer: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Create an orchestrator from a configuration. Fails fast on any
    /// violated configuration invariant.
    pub fn new(config: OrchestrationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dispatcher =
            ReviewDispatcher::new(config.review_timeout, config.enable_parallel_review);
        Ok(Self {
            state: RwLock::new(OrchestratorState {
                registry: AgentRegistry::new(config.max_agents),
                metrics: OrchestrationMetrics::default(),
            }),
            events: EventBus::default(),
            dispatcher,
            cancellation: None,
            shutdown: CancellationToken::new(),
            consumer: Mutex::new(None),
            config,
        })
    }

    /// Create an orchestrator and register an agent for every enabled
    /// profile, built through the given runner gateway.
    pub fn bootstrap(
        config: OrchestrationConfig,
        gateway: Arc<dyn RunnerGateway>,
    ) -> Result<Self, OrchestrationError> {
        let orchestrator = Self::new(config)?;
        let factory = crate::agents::factory::AgentFactory::new(gateway);
        for agent in factory.build_all(&orchestrator.config)? {
            orchestrator.register_agent(agent)?;
        }
        Ok(orchestrator)
    }

    /// Derive every task's deadline from this caller-owned scope.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    // ==================== Registration ====================

    /// Register an agent.
    ///
    /// Fails with a config error when the registry is at `max_agents` and
    /// an input error on a duplicate id; neither changes any state.
    pub fn register_agent(&self, agent: Arc<dyn Agent>) -> Result<(), OrchestrationError> {
        let mut state = self.write_state();
        state.registry.register(agent)
    }

    /// Remove an agent by id. Returns whether an agent was removed.
    pub fn deregister_agent(&self, id: &AgentId) -> bool {
        self.write_state().registry.deregister(id).is_some()
    }

    /// Number of registered agents.
    pub fn agent_count(&self) -> usize {
        self.read_state().registry.len()
    }

    // ==================== Task lifecycle ====================

    /// Execute a task end to end: lead, per-proposal review rounds,
    /// consensus, events, metrics.
    ///
    /// Always returns a terminal result; failures are carried in the
    /// result's status and error, never panicked or swallowed.
    pub async fn execute_task(&self, task: &Task) -> OrchestrationResult {
        let started = Instant::now();
        info!("Task {} started ({})", task.id, task.kind);
        self.events.emit(
            OrchestrationEvent::new(EventKind::TaskStarted)
                .with_task(task.id.clone())
                .with_metadata("kind", task.kind.as_str()),
        );
        self.write_state().metrics.record_task_started();

        if let Err(e) = task.validate() {
            return self.fail_task(task, InputError::from(e).into(), started);
        }

        // Snapshot the lead out of the registry; the lock must not be held
        // across the model call below.
        let lead = self.read_state().registry.by_role(AgentRole::Lead).first().cloned();
        let Some(lead) = lead else {
            return self.fail_task(task, ConfigError::NoLeadAgent.into(), started);
        };

        let lead_result = match self.run_lead(&lead, task).await {
            Ok(result) => result,
            Err(e) => return self.fail_task(task, e, started),
        };
        self.write_state().metrics.record_agent_use(lead.id());

        // Review each proposal strictly in order; the consensus for one
        // completes before the next round begins.
        let proposals = lead_result.proposals.clone();
        let mut consensus_results = Vec::with_capacity(proposals.len());
        let mut any_approved = false;
        for proposal in &proposals {
            match self.review_proposal(proposal).await {
                Ok(consensus) => {
                    any_approved |= consensus.is_approved();
                    consensus_results.push(consensus);
                }
                Err(e) => return self.fail_task(task, e, started),
            }
        }

        let (status, final_result) = if proposals.is_empty() || any_approved {
            (ResultStatus::Success, Some(lead_result))
        } else {
            // Proposals exist but none was approved; the consensus results
            // carry the full story.
            (ResultStatus::Partial, None)
        };

        let duration = started.elapsed();
        self.write_state().metrics.record_task_completed(duration);
        info!(
            "Task {} completed as {} in {}ms",
            task.id,
            status,
            duration.as_millis()
        );
        self.events.emit(
            OrchestrationEvent::new(EventKind::TaskCompleted)
                .with_task(task.id.clone())
                .with_agent(lead.id().clone())
                .with_metadata("status", status.as_str())
                .with_metadata("duration_ms", duration.as_millis().to_string()),
        );

        OrchestrationResult::completed(
            task.id.clone(),
            status,
            consensus_results,
            final_result,
            duration.as_millis() as u64,
        )
    }

    /// Run one review round over a proposal: select reviewers, dispatch,
    /// aggregate, resolve conflicts.
    pub async fn review_proposal(
        &self,
        proposal: &Proposal,
    ) -> Result<ConsensusResult, OrchestrationError> {
        self.check_cancelled()?;
        self.events.emit(
            OrchestrationEvent::new(EventKind::ReviewStarted)
                .with_proposal(proposal.id.clone())
                .with_agent(proposal.author.clone()),
        );

        let reviewers = self.select_reviewers()?;
        debug!(
            "Dispatching proposal {} to {} reviewer(s)",
            proposal.id,
            reviewers.len()
        );

        let reviews = self
            .dispatcher
            .dispatch(proposal, &reviewers, self.cancellation.as_ref())
            .await;

        let evaluation = evaluate(
            &reviews,
            self.config.consensus_threshold,
            &self.config.quality_gate,
        );
        let mut consensus =
            ConsensusResult::from_evaluation(proposal.id.clone(), evaluation, reviews);

        {
            let mut state = self.write_state();
            for reviewer in &reviewers {
                state.metrics.record_agent_use(reviewer.id());
            }
            state.metrics.record_review_round(
                !consensus.decision.is_no_consensus(),
                consensus.has_conflicts(),
            );
        }

        if consensus.has_conflicts() {
            warn!(
                "Proposal {} produced {} conflict(s); resolving via {}",
                proposal.id,
                consensus.conflicts.len(),
                self.config.conflict_resolution
            );
            self.events.emit(
                OrchestrationEvent::new(EventKind::ConflictDetected)
                    .with_proposal(proposal.id.clone())
                    .with_metadata("conflicts", consensus.conflicts.len().to_string()),
            );
            let resolution = resolve_conflicts(
                self.config.conflict_resolution,
                &consensus.reviews,
                self.resolver_id(),
            );
            consensus = consensus.with_resolution(resolution);
        }

        if !consensus.decision.is_no_consensus() {
            self.events.emit(
                OrchestrationEvent::new(EventKind::ConsensusReached)
                    .with_proposal(proposal.id.clone())
                    .with_metadata("decision", consensus.decision.as_str())
                    .with_metadata("score", format!("{:.2}", consensus.score)),
            );
        }
        self.events.emit(
            OrchestrationEvent::new(EventKind::ReviewCompleted)
                .with_proposal(proposal.id.clone())
                .with_metadata("decision", consensus.decision.as_str())
                .with_metadata("reviews", consensus.reviews.len().to_string()),
        );

        Ok(consensus)
    }

    /// Snapshot of the current metrics.
    pub fn metrics(&self) -> OrchestrationMetrics {
        self.read_state().metrics.clone()
    }

    /// Claim the event receiver for external consumption.
    ///
    /// Single-consumer: returns `None` once claimed (also by `start`).
    pub fn subscribe(&self) -> Option<tokio::sync::mpsc::Receiver<OrchestrationEvent>> {
        self.events.subscribe()
    }

    // ==================== Event consumer lifecycle ====================

    /// Spawn the background event consumer.
    ///
    /// A no-op when the receiver was already claimed via `subscribe`.
    pub fn start(&self) {
        let Some(mut rx) = self.events.subscribe() else {
            debug!("Event receiver already claimed; no consumer spawned");
            return;
        };
        let shutdown = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        debug!(
                            "Orchestration event {:?} (task: {:?}, proposal: {:?})",
                            event.kind, event.task_id, event.proposal_id
                        );
                    }
                }
            }
        });
        *self.consumer.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Signal the event consumer to exit and wait for it.
    ///
    /// Consumer-side only: in-flight tasks continue to their own deadlines
    /// and later events are dropped rather than blocking anyone.
    pub async fn stop(&self) {
        self.shutdown.cancel();
        let handle = self.consumer.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    // ==================== Internals ====================

    fn read_state(&self) -> RwLockReadGuard<'_, OrchestratorState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, OrchestratorState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check_cancelled(&self) -> Result<(), OrchestrationError> {
        if let Some(token) = &self.cancellation
            && token.is_cancelled()
        {
            return Err(OrchestrationError::Cancelled);
        }
        Ok(())
    }

    /// Bound the lead invocation with the task timeout and the caller's
    /// cancellation scope.
    async fn run_lead(
        &self,
        lead: &Arc<dyn Agent>,
        task: &Task,
    ) -> Result<AgentResult, OrchestrationError> {
        let bounded = time::timeout(self.config.task_timeout, lead.execute(task));
        let result = if let Some(token) = &self.cancellation {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(OrchestrationError::Cancelled),
                result = bounded => result,
            }
        } else {
            bounded.await
        };
        result.map_err(|_| OrchestrationError::Timeout(self.config.task_timeout))?
    }

    /// Select the reviewer pool for one round.
    ///
    /// Role reviewers holding every required capability, unioned with the
    /// mandatory reviewers, bounded by the gate's min/max. Truncation keeps
    /// the earliest-registered reviewers, which is deterministic.
    fn select_reviewers(&self) -> Result<Vec<Arc<dyn Agent>>, OrchestrationError> {
        let gate = &self.config.quality_gate;
        let mut selected: Vec<Arc<dyn Agent>>;
        {
            let state = self.read_state();
            selected = state
                .registry
                .by_role(AgentRole::Reviewer)
                .into_iter()
                .filter(|agent| {
                    gate.required_capabilities
                        .iter()
                        .all(|c| agent.has_capability(*c))
                })
                .collect();

            for id in &gate.mandatory_reviewers {
                if selected.iter().any(|a| a.id() == id) {
                    continue;
                }
                match state.registry.get(id) {
                    Some(agent) => selected.push(agent),
                    None => warn!("Mandatory reviewer '{}' is not registered", id),
                }
            }

            selected.sort_by_key(|a| state.registry.position(a.id()).unwrap_or(usize::MAX));
        }

        if selected.len() < gate.min_reviewers {
            return Err(ConfigError::InsufficientReviewers {
                found: selected.len(),
                required: gate.min_reviewers,
            }
            .into());
        }
        selected.truncate(gate.max_reviewers);
        Ok(selected)
    }

    /// Who signs conflict resolutions: the lead for arbitration, the
    /// orchestrator itself otherwise.
    fn resolver_id(&self) -> AgentId {
        use concord_domain::ResolutionMethod;
        if self.config.conflict_resolution == ResolutionMethod::Arbitration {
            let leads = self.read_state().registry.by_role(AgentRole::Lead);
            if let Some(lead) = leads.first() {
                return lead.id().clone();
            }
        }
        AgentId::new("orchestrator")
    }

    /// Mark a task failed: metrics, event, terminal result.
    fn fail_task(
        &self,
        task: &Task,
        error: OrchestrationError,
        started: Instant,
    ) -> OrchestrationResult {
        warn!("Task {} failed: {}", task.id, error);
        self.write_state().metrics.record_task_failed();
        self.events.emit(
            OrchestrationEvent::new(EventKind::TaskFailed)
                .with_task(task.id.clone())
                .with_metadata("error", error.to_string()),
        );
        OrchestrationResult::failed(
            task.id.clone(),
            error.to_string(),
            started.elapsed().as_millis() as u64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentProfile;
    use async_trait::async_trait;
    use concord_domain::{
        Capability, ConsensusDecision, ProposalKind, QualityGate, ReviewDecision, ReviewResult,
        Specialization, TaskKind,
    };
    use std::time::Duration;

    // ==================== Test doubles ====================

    /// Lead that fabricates a fixed number of proposals.
    #[derive(Debug)]
    struct ScriptedLead {
        id: AgentId,
        proposal_count: usize,
        delay: Duration,
        fail: bool,
    }

    impl ScriptedLead {
        fn new(id: &str, proposal_count: usize) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                proposal_count,
                delay: Duration::ZERO,
                fail: false,
            })
        }

        fn slow(id: &str, delay: Duration) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                proposal_count: 0,
                delay,
                fail: false,
            })
        }

        fn failing(id: &str) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                proposal_count: 0,
                delay: Duration::ZERO,
                fail: true,
            })
        }
    }

    #[async_trait]
    impl Agent for ScriptedLead {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn role(&self) -> AgentRole {
            AgentRole::Lead
        }

        fn capabilities(&self) -> &[Capability] {
            &[Capability::CodeGeneration]
        }

        async fn execute(&self, task: &Task) -> Result<AgentResult, OrchestrationError> {
            if !self.delay.is_zero() {
                time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(OrchestrationError::Internal("lead broke".into()));
            }
            let proposals = (0..self.proposal_count)
                .map(|i| {
                    Proposal::new(self.id.clone(), ProposalKind::FileChange, format!("fix {}", i))
                        .with_id(format!("p-{}", i))
                        .with_confidence(0.9)
                })
                .collect();
            Ok(AgentResult::success(task.id.clone(), self.id.clone())
                .with_proposals(proposals)
                .with_confidence(0.9))
        }

        async fn review(&self, proposal: &Proposal) -> Result<ReviewResult, OrchestrationError> {
            Ok(ReviewResult::new(
                proposal.id.clone(),
                self.id.clone(),
                ReviewDecision::Approve,
            ))
        }
    }

    /// Reviewer with a scripted verdict.
    #[derive(Debug)]
    struct ScriptedReviewer {
        id: AgentId,
        role: AgentRole,
        decision: ReviewDecision,
        score: f64,
        confidence: f64,
        delay: Duration,
    }

    impl ScriptedReviewer {
        fn approving(id: &str) -> Arc<dyn Agent> {
            Self::with_verdict(id, ReviewDecision::Approve, 0.9, 0.9)
        }

        fn with_verdict(
            id: &str,
            decision: ReviewDecision,
            score: f64,
            confidence: f64,
        ) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                role: AgentRole::Reviewer,
                decision,
                score,
                confidence,
                delay: Duration::ZERO,
            })
        }

        fn slow(id: &str, delay: Duration) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                role: AgentRole::Reviewer,
                decision: ReviewDecision::Approve,
                score: 0.9,
                confidence: 0.9,
                delay,
            })
        }

        fn expert(id: &str) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                role: AgentRole::Expert,
                decision: ReviewDecision::Approve,
                score: 0.9,
                confidence: 0.9,
                delay: Duration::ZERO,
            })
        }
    }

    #[async_trait]
    impl Agent for ScriptedReviewer {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn role(&self) -> AgentRole {
            self.role
        }

        fn capabilities(&self) -> &[Capability] {
            &[Capability::CodeReview]
        }

        fn specialization(&self) -> Option<Specialization> {
            Some(Specialization::General)
        }

        async fn execute(&self, task: &Task) -> Result<AgentResult, OrchestrationError> {
            Err(InputError::TaskKindNotSupported {
                kind: task.kind,
                agent: self.id.clone(),
            }
            .into())
        }

        async fn review(&self, proposal: &Proposal) -> Result<ReviewResult, OrchestrationError> {
            if !self.delay.is_zero() {
                time::sleep(self.delay).await;
            }
            Ok(
                ReviewResult::new(proposal.id.clone(), self.id.clone(), self.decision)
                    .with_score(self.score)
                    .with_confidence(self.confidence),
            )
        }
    }

    fn test_config() -> OrchestrationConfig {
        OrchestrationConfig::default()
            .without_profiles()
            .with_profile("lead", AgentProfile::new(AgentRole::Lead, "default"))
            .with_quality_gate(
                QualityGate::default()
                    .with_min_confidence(0.5)
                    .with_reviewer_bounds(2, 4),
            )
            .with_review_timeout(Duration::from_secs(2))
    }

    fn task() -> Task {
        Task::new(TaskKind::Edit, "fix the bug").with_id("t-1")
    }

    // ==================== End-to-end scenarios ====================

    #[tokio::test]
    async fn test_unanimous_approval_flow() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 1)).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-1")).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-2")).unwrap();
        let mut rx = orchestrator.subscribe().unwrap();

        let result = orchestrator.execute_task(&task()).await;

        assert!(result.is_success());
        assert_eq!(result.consensus.len(), 1);
        assert_eq!(result.consensus[0].decision, ConsensusDecision::Approve);
        assert!((result.consensus[0].score - 0.9).abs() < 1e-9);
        assert!(result.consensus[0].conflicts.is_empty());
        assert!(result.final_result.is_some());

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskStarted,
                EventKind::ReviewStarted,
                EventKind::ConsensusReached,
                EventKind::ReviewCompleted,
                EventKind::TaskCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn test_low_confidence_override_detects_conflict() {
        let orchestrator = Orchestrator::new(
            test_config().with_quality_gate(
                QualityGate::default()
                    .with_min_confidence(0.8)
                    .with_reviewer_bounds(2, 4),
            ),
        )
        .unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 1)).unwrap();
        for id in ["rev-1", "rev-2", "rev-3"] {
            orchestrator
                .register_agent(ScriptedReviewer::with_verdict(
                    id,
                    ReviewDecision::Approve,
                    0.9,
                    0.5,
                ))
                .unwrap();
        }
        let mut rx = orchestrator.subscribe().unwrap();

        let result = orchestrator.execute_task(&task()).await;

        assert_eq!(result.status, ResultStatus::Partial);
        let consensus = &result.consensus[0];
        assert_eq!(consensus.decision, ConsensusDecision::NoConsensus);
        assert_eq!(consensus.conflicts.len(), 1);
        assert!(
            consensus.conflicts[0]
                .description
                .contains("Low confidence: 0.50 < 0.80")
        );
        // voting resolution is attached once a conflict exists
        let resolution = consensus.resolution.as_ref().unwrap();
        assert!(resolution.rationale.starts_with("Resolved by majority vote"));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert!(kinds.contains(&EventKind::ConflictDetected));
        assert!(!kinds.contains(&EventKind::ConsensusReached));
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_no_consensus() {
        let orchestrator = Orchestrator::new(
            test_config().with_review_timeout(Duration::from_millis(100)),
        )
        .unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();
        orchestrator
            .register_agent(ScriptedReviewer::slow("fast", Duration::from_millis(10)))
            .unwrap();
        orchestrator
            .register_agent(ScriptedReviewer::slow("slow", Duration::from_secs(10)))
            .unwrap();

        let proposal = Proposal::new("lead-1".into(), ProposalKind::FileChange, "fix");
        let consensus = orchestrator.review_proposal(&proposal).await.unwrap();

        // only the fast review lands; quorum of 2 is not met
        assert_eq!(consensus.reviews.len(), 1);
        assert_eq!(consensus.decision, ConsensusDecision::NoConsensus);
    }

    #[tokio::test]
    async fn test_registration_cap_then_execution_proceeds() {
        let config = test_config()
            .with_max_agents(2)
            .with_quality_gate(
                QualityGate::default()
                    .with_min_confidence(0.5)
                    .with_reviewer_bounds(1, 4),
            );
        let orchestrator = Orchestrator::new(config).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 1)).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-1")).unwrap();

        let err = orchestrator
            .register_agent(ScriptedReviewer::approving("rev-2"))
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::Config(ConfigError::AgentLimitReached(2))
        ));
        assert_eq!(orchestrator.agent_count(), 2);

        let result = orchestrator.execute_task(&task()).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_no_lead_fails_task() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-1")).unwrap();

        let result = orchestrator.execute_task(&task()).await;

        assert_eq!(result.status, ResultStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("No lead agent"));
        let metrics = orchestrator.metrics();
        assert_eq!(metrics.total_tasks, 1);
        assert_eq!(metrics.failed_tasks, 1);
    }

    #[tokio::test]
    async fn test_lead_error_surfaces_as_failed_result() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::failing("lead-1")).unwrap();
        let mut rx = orchestrator.subscribe().unwrap();

        let result = orchestrator.execute_task(&task()).await;

        assert_eq!(result.status, ResultStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("lead broke"));

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::TaskStarted, EventKind::TaskFailed]);
    }

    #[tokio::test]
    async fn test_lead_timeout_fails_task() {
        let orchestrator = Orchestrator::new(
            test_config().with_task_timeout(Duration::from_millis(50)),
        )
        .unwrap();
        orchestrator
            .register_agent(ScriptedLead::slow("lead-1", Duration::from_secs(10)))
            .unwrap();

        let result = orchestrator.execute_task(&task()).await;
        assert_eq!(result.status, ResultStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("Timed out"));
    }

    #[tokio::test]
    async fn test_no_proposals_promotes_lead_result() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();

        let result = orchestrator.execute_task(&task()).await;

        assert!(result.is_success());
        assert!(result.consensus.is_empty());
        assert_eq!(
            result.final_result.unwrap().agent.as_str(),
            "lead-1"
        );
    }

    #[tokio::test]
    async fn test_insufficient_reviewers_is_config_error() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();

        let proposal = Proposal::new("lead-1".into(), ProposalKind::FileChange, "fix");
        let err = orchestrator.review_proposal(&proposal).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::Config(ConfigError::InsufficientReviewers {
                found: 0,
                required: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_mandatory_expert_joins_round() {
        let config = test_config().with_quality_gate(
            QualityGate::default()
                .with_min_confidence(0.5)
                .with_reviewer_bounds(2, 4)
                .with_mandatory_reviewer("sec-expert"),
        );
        let orchestrator = Orchestrator::new(config).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-1")).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-2")).unwrap();
        orchestrator.register_agent(ScriptedReviewer::expert("sec-expert")).unwrap();

        let proposal = Proposal::new("lead-1".into(), ProposalKind::FileChange, "fix");
        let consensus = orchestrator.review_proposal(&proposal).await.unwrap();

        let participants: Vec<&str> =
            consensus.participants.iter().map(|a| a.as_str()).collect();
        assert!(participants.contains(&"sec-expert"));
    }

    #[tokio::test]
    async fn test_truncation_keeps_earliest_registered() {
        let config = test_config().with_quality_gate(
            QualityGate::default()
                .with_min_confidence(0.5)
                .with_reviewer_bounds(1, 2),
        );
        let orchestrator = Orchestrator::new(config).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();
        for id in ["rev-1", "rev-2", "rev-3"] {
            orchestrator.register_agent(ScriptedReviewer::approving(id)).unwrap();
        }

        let proposal = Proposal::new("lead-1".into(), ProposalKind::FileChange, "fix");
        let consensus = orchestrator.review_proposal(&proposal).await.unwrap();

        let mut participants: Vec<&str> =
            consensus.participants.iter().map(|a| a.as_str()).collect();
        participants.sort_unstable();
        assert_eq!(participants, vec!["rev-1", "rev-2"]);
    }

    #[tokio::test]
    async fn test_metrics_count_every_terminal_task_once() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();

        orchestrator.execute_task(&task()).await;
        orchestrator
            .execute_task(&Task::new(TaskKind::Analyze, "  ").with_id("bad"))
            .await;

        let metrics = orchestrator.metrics();
        assert_eq!(metrics.total_tasks, 2);
        assert_eq!(metrics.completed_tasks, 1);
        assert_eq!(metrics.failed_tasks, 1);
        assert!(metrics.completed_tasks + metrics.failed_tasks <= metrics.total_tasks);
        assert_eq!(metrics.agent_utilization.get("lead-1"), Some(&1));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();
        let err = orchestrator
            .register_agent(ScriptedLead::new("lead-1", 0))
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::Input(InputError::DuplicateAgent(_))
        ));
        assert_eq!(orchestrator.agent_count(), 1);
    }

    #[tokio::test]
    async fn test_stop_is_consumer_side_only() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 0)).unwrap();

        orchestrator.start();
        orchestrator.stop().await;

        // tasks still run after stop; events are dropped silently
        let result = orchestrator.execute_task(&task()).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_cancellation_scope_cascades() {
        let token = CancellationToken::new();
        let orchestrator = Orchestrator::new(test_config())
            .unwrap()
            .with_cancellation_token(token.clone());
        orchestrator
            .register_agent(ScriptedLead::slow("lead-1", Duration::from_secs(10)))
            .unwrap();

        token.cancel();
        let result = orchestrator.execute_task(&task()).await;
        assert_eq!(result.status, ResultStatus::Failed);
        assert!(result.error.as_deref().unwrap().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_multiple_proposals_reviewed_in_order() {
        let orchestrator = Orchestrator::new(test_config()).unwrap();
        orchestrator.register_agent(ScriptedLead::new("lead-1", 3)).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-1")).unwrap();
        orchestrator.register_agent(ScriptedReviewer::approving("rev-2")).unwrap();

        let result = orchestrator.execute_task(&task()).await;

        assert!(result.is_success());
        let order: Vec<&str> = result
            .consensus
            .iter()
            .map(|c| c.proposal_id.as_str())
            .collect();
        assert_eq!(order, vec!["p-0", "p-1", "p-2"]);
    }
}
