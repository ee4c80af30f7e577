//! Consensus result - the complete record of one review round.

use super::conflict::{Conflict, Resolution};
use super::decision::ConsensusDecision;
use super::engine::ConsensusEvaluation;
use crate::agent::value_objects::AgentId;
use crate::core::time::current_timestamp;
use crate::proposal::value_objects::ProposalId;
use crate::review::entities::ReviewResult;
use serde::{Deserialize, Serialize};

/// The complete outcome of one review round over a proposal.
///
/// Constructed fresh per round; participants are always derived from the
/// reviews themselves, so every listed participant actually reviewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// The proposal that was reviewed
    pub proposal_id: ProposalId,
    /// The round's verdict
    pub decision: ConsensusDecision,
    /// Mean reviewer score
    pub score: f64,
    /// Every review that was collected
    pub reviews: Vec<ReviewResult>,
    /// Disagreements detected during aggregation
    pub conflicts: Vec<Conflict>,
    /// How the disagreements were settled, when any were detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// The reviewers that participated, in review order, de-duplicated
    pub participants: Vec<AgentId>,
    /// Completion timestamp (milliseconds since epoch)
    pub timestamp: u64,
}

impl ConsensusResult {
    /// Assemble a result from the engine's evaluation and the collected
    /// reviews.
    pub fn from_evaluation(
        proposal_id: ProposalId,
        evaluation: ConsensusEvaluation,
        reviews: Vec<ReviewResult>,
    ) -> Self {
        let mut participants: Vec<AgentId> = Vec::new();
        for review in &reviews {
            if !participants.contains(&review.reviewer) {
                participants.push(review.reviewer.clone());
            }
        }

        Self {
            proposal_id,
            decision: evaluation.decision,
            score: evaluation.score,
            reviews,
            conflicts: evaluation.conflicts,
            resolution: None,
            participants,
            timestamp: current_timestamp(),
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn is_approved(&self) -> bool {
        self.decision.is_approved()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::engine::evaluate;
    use crate::consensus::gate::QualityGate;
    use crate::review::value_objects::ReviewDecision;

    fn review(reviewer: &str, decision: ReviewDecision) -> ReviewResult {
        ReviewResult::new("p-1".into(), reviewer.into(), decision)
            .with_score(0.9)
            .with_confidence(0.9)
    }

    #[test]
    fn test_participants_derived_from_reviews() {
        let reviews = vec![
            review("b", ReviewDecision::Approve),
            review("a", ReviewDecision::Approve),
        ];
        let evaluation = evaluate(&reviews, 0.7, &QualityGate::default());
        let result = ConsensusResult::from_evaluation("p-1".into(), evaluation, reviews);

        let ids: Vec<&str> = result.participants.iter().map(|a| a.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]); // review order, not sorted
        assert!(result.is_approved());
        assert!(!result.has_conflicts());
    }

    #[test]
    fn test_duplicate_reviewers_deduplicated() {
        let reviews = vec![
            review("a", ReviewDecision::Approve),
            review("a", ReviewDecision::Approve),
        ];
        let evaluation = evaluate(&reviews, 0.7, &QualityGate::default());
        let result = ConsensusResult::from_evaluation("p-1".into(), evaluation, reviews);
        assert_eq!(result.participants.len(), 1);
        assert_eq!(result.reviews.len(), 2);
    }
}
