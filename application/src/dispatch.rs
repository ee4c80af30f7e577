//! Review dispatcher - runs a reviewer pool against one proposal.
//!
//! Two scheduling modes share the same guarantees: no review blocks past
//! the round deadline, no reviewer failure propagates to its peers, and the
//! returned list never exceeds the number of reviewers dispatched.
//!
//! In parallel mode the returned reviews are in completion order, not
//! submission order. That ordering is observable; consensus aggregation is
//! order-invariant, so downstream results do not depend on it.

use crate::agents::Agent;
use concord_domain::{Proposal, ReviewResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Dispatches one proposal to a pool of reviewers under a shared deadline.
pub struct ReviewDispatcher {
    timeout: Duration,
    parallel: bool,
}

impl ReviewDispatcher {
    pub fn new(timeout: Duration, parallel: bool) -> Self {
        Self { timeout, parallel }
    }

    /// Run the round and return whatever completed within the deadline.
    pub async fn dispatch(
        &self,
        proposal: &Proposal,
        reviewers: &[Arc<dyn Agent>],
        cancellation: Option<&CancellationToken>,
    ) -> Vec<ReviewResult> {
        if reviewers.is_empty() {
            return Vec::new();
        }
        if self.parallel {
            self.dispatch_parallel(proposal, reviewers, cancellation)
                .await
        } else {
            self.dispatch_sequential(proposal, reviewers, cancellation)
                .await
        }
    }

    /// Fan-out, single-deadline fan-in.
    ///
    /// Every review starts concurrently under one child cancellation token.
    /// When the deadline fires, outstanding reviewers are signalled to
    /// cancel and whatever completed is returned.
    async fn dispatch_parallel(
        &self,
        proposal: &Proposal,
        reviewers: &[Arc<dyn Agent>],
        cancellation: Option<&CancellationToken>,
    ) -> Vec<ReviewResult> {
        let cancel = cancellation
            .map(CancellationToken::child_token)
            .unwrap_or_default();
        let deadline = Instant::now() + self.timeout;
        let mut join_set = JoinSet::new();

        for reviewer in reviewers {
            let reviewer = Arc::clone(reviewer);
            let proposal = proposal.clone();
            let token = cancel.clone();

            join_set.spawn(async move {
                let id = reviewer.id().clone();
                tokio::select! {
                    biased;
                    _ = token.cancelled() => (id, None),
                    result = reviewer.review(&proposal) => (id, Some(result)),
                }
            });
        }

        let mut reviews = Vec::new();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Review round cancelled with {} reviewers outstanding", join_set.len());
                    join_set.shutdown().await;
                    break;
                }
                _ = time::sleep_until(deadline) => {
                    warn!(
                        "Review deadline expired with {} reviewer(s) outstanding; returning {} completed",
                        join_set.len(),
                        reviews.len()
                    );
                    cancel.cancel();
                    join_set.shutdown().await;
                    break;
                }
                next = join_set.join_next() => {
                    let Some(next) = next else { break };
                    match next {
                        Ok((id, Some(Ok(review)))) => {
                            debug!("Reviewer {} completed with {}", id, review.decision);
                            reviews.push(review);
                        }
                        Ok((id, Some(Err(e)))) => {
                            // Individual failures are dropped, never fatal.
                            warn!("Reviewer {} failed: {}", id, e);
                        }
                        Ok((id, None)) => {
                            debug!("Reviewer {} cancelled before completing", id);
                        }
                        Err(e) => {
                            warn!("Task join error: {}", e);
                        }
                    }
                }
            }
        }

        reviews
    }

    /// One reviewer at a time, in registry-iteration order.
    ///
    /// The deadline is checked before each reviewer starts and bounds each
    /// review to the remaining budget; on expiry the loop breaks and the
    /// accumulated reviews are returned.
    async fn dispatch_sequential(
        &self,
        proposal: &Proposal,
        reviewers: &[Arc<dyn Agent>],
        cancellation: Option<&CancellationToken>,
    ) -> Vec<ReviewResult> {
        let deadline = Instant::now() + self.timeout;
        let mut reviews = Vec::new();

        for reviewer in reviewers {
            if cancellation.is_some_and(|t| t.is_cancelled()) {
                debug!("Sequential review cancelled after {} review(s)", reviews.len());
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "Review deadline reached; returning {} accumulated review(s)",
                    reviews.len()
                );
                break;
            }

            match time::timeout(deadline - now, reviewer.review(proposal)).await {
                Ok(Ok(review)) => {
                    debug!("Reviewer {} completed with {}", reviewer.id(), review.decision);
                    reviews.push(review);
                }
                Ok(Err(e)) => {
                    warn!("Reviewer {} failed: {}", reviewer.id(), e);
                }
                Err(_) => {
                    warn!("Reviewer {} exceeded the review deadline", reviewer.id());
                    break;
                }
            }
        }

        reviews
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::error::OrchestrationError;
    use async_trait::async_trait;
    use concord_domain::{
        AgentId, AgentResult, AgentRole, Capability, ProposalKind, ReviewDecision, Task,
    };

    /// Reviewer that answers after a fixed delay.
    #[derive(Debug)]
    struct TimedReviewer {
        id: AgentId,
        delay: Duration,
        decision: ReviewDecision,
        fail: bool,
    }

    impl TimedReviewer {
        fn new(id: &str, delay: Duration, decision: ReviewDecision) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                delay,
                decision,
                fail: false,
            })
        }

        fn failing(id: &str) -> Arc<dyn Agent> {
            Arc::new(Self {
                id: id.into(),
                delay: Duration::ZERO,
                decision: ReviewDecision::Approve,
                fail: true,
            })
        }
    }

    #[async_trait]
    impl Agent for TimedReviewer {
        fn id(&self) -> &AgentId {
            &self.id
        }

        fn role(&self) -> AgentRole {
            AgentRole::Reviewer
        }

        fn capabilities(&self) -> &[Capability] {
            &[Capability::CodeReview]
        }

        async fn execute(&self, task: &Task) -> Result<AgentResult, OrchestrationError> {
            Ok(AgentResult::success(task.id.clone(), self.id.clone()))
        }

        async fn review(&self, proposal: &Proposal) -> Result<ReviewResult, OrchestrationError> {
            if !self.delay.is_zero() {
                time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(OrchestrationError::Internal("reviewer broke".into()));
            }
            Ok(
                ReviewResult::new(proposal.id.clone(), self.id.clone(), self.decision)
                    .with_score(0.9)
                    .with_confidence(0.9),
            )
        }
    }

    fn proposal() -> Proposal {
        Proposal::new("lead".into(), ProposalKind::FileChange, "fix")
    }

    #[tokio::test]
    async fn test_parallel_collects_all_reviews() {
        let dispatcher = ReviewDispatcher::new(Duration::from_secs(5), true);
        let reviewers = vec![
            TimedReviewer::new("a", Duration::from_millis(5), ReviewDecision::Approve),
            TimedReviewer::new("b", Duration::from_millis(10), ReviewDecision::Reject),
            TimedReviewer::new("c", Duration::ZERO, ReviewDecision::Approve),
        ];

        let reviews = dispatcher.dispatch(&proposal(), &reviewers, None).await;
        assert_eq!(reviews.len(), 3);
    }

    #[tokio::test]
    async fn test_parallel_deadline_returns_partial_set() {
        let dispatcher = ReviewDispatcher::new(Duration::from_millis(100), true);
        let reviewers = vec![
            TimedReviewer::new("fast", Duration::from_millis(10), ReviewDecision::Approve),
            TimedReviewer::new("slow", Duration::from_secs(10), ReviewDecision::Reject),
        ];

        let reviews = dispatcher.dispatch(&proposal(), &reviewers, None).await;
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].reviewer.as_str(), "fast");
    }

    #[tokio::test]
    async fn test_parallel_failures_dropped_not_fatal() {
        let dispatcher = ReviewDispatcher::new(Duration::from_secs(5), true);
        let reviewers = vec![
            TimedReviewer::failing("broken"),
            TimedReviewer::new("ok", Duration::from_millis(5), ReviewDecision::Approve),
        ];

        let reviews = dispatcher.dispatch(&proposal(), &reviewers, None).await;
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].reviewer.as_str(), "ok");
    }

    #[tokio::test]
    async fn test_sequential_runs_in_order() {
        let dispatcher = ReviewDispatcher::new(Duration::from_secs(5), false);
        let reviewers = vec![
            TimedReviewer::new("first", Duration::from_millis(5), ReviewDecision::Approve),
            TimedReviewer::new("second", Duration::ZERO, ReviewDecision::Reject),
        ];

        let reviews = dispatcher.dispatch(&proposal(), &reviewers, None).await;
        let order: Vec<&str> = reviews.iter().map(|r| r.reviewer.as_str()).collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_sequential_deadline_breaks_loop() {
        let dispatcher = ReviewDispatcher::new(Duration::from_millis(50), false);
        let reviewers = vec![
            TimedReviewer::new("fast", Duration::from_millis(5), ReviewDecision::Approve),
            TimedReviewer::new("slow", Duration::from_secs(10), ReviewDecision::Reject),
            TimedReviewer::new("after", Duration::ZERO, ReviewDecision::Approve),
        ];

        let reviews = dispatcher.dispatch(&proposal(), &reviewers, None).await;
        // the slow reviewer times out and the loop stops before "after"
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].reviewer.as_str(), "fast");
    }

    #[tokio::test]
    async fn test_sequential_skips_individual_failures() {
        let dispatcher = ReviewDispatcher::new(Duration::from_secs(5), false);
        let reviewers = vec![
            TimedReviewer::failing("broken"),
            TimedReviewer::new("ok", Duration::ZERO, ReviewDecision::Approve),
        ];

        let reviews = dispatcher.dispatch(&proposal(), &reviewers, None).await;
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].reviewer.as_str(), "ok");
    }

    #[tokio::test]
    async fn test_result_length_bounded_by_reviewer_count() {
        let dispatcher = ReviewDispatcher::new(Duration::from_secs(1), true);
        let reviewers: Vec<_> = (0..4)
            .map(|i| {
                TimedReviewer::new(
                    &format!("r{}", i),
                    Duration::from_millis(i as u64),
                    ReviewDecision::Approve,
                )
            })
            .collect();

        let reviews = dispatcher.dispatch(&proposal(), &reviewers, None).await;
        assert!(reviews.len() <= reviewers.len());
    }

    #[tokio::test]
    async fn test_cancellation_stops_parallel_round() {
        let dispatcher = ReviewDispatcher::new(Duration::from_secs(10), true);
        let reviewers = vec![
            TimedReviewer::new("slow-a", Duration::from_secs(5), ReviewDecision::Approve),
            TimedReviewer::new("slow-b", Duration::from_secs(5), ReviewDecision::Approve),
        ];
        let token = CancellationToken::new();
        let cancel_after = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(20)).await;
            cancel_after.cancel();
        });

        let started = std::time::Instant::now();
        let reviews = dispatcher
            .dispatch(&proposal(), &reviewers, Some(&token))
            .await;
        assert!(reviews.is_empty());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_empty_reviewer_list_returns_empty() {
        let dispatcher = ReviewDispatcher::new(Duration::from_secs(1), true);
        let reviews = dispatcher.dispatch(&proposal(), &[], None).await;
        assert!(reviews.is_empty());
    }
}
