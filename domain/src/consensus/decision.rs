//! Consensus decision - the single verdict of a review round.

use crate::review::value_objects::ReviewDecision;
use serde::{Deserialize, Serialize};

/// Outcome of a consensus round over one proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusDecision {
    /// The proposal may be applied
    Approve,
    /// The proposal must not be applied
    Reject,
    /// The proposal needs revision before another round
    RequireChanges,
    /// The reviewers did not converge (split vote, low confidence, or an
    /// empty round)
    NoConsensus,
}

impl ConsensusDecision {
    /// Map a majority reviewer decision to the consensus verdict.
    ///
    /// `needs_more_info` deliberately maps to `NoConsensus`: it is not a
    /// positive outcome. Callers that want a distinct "needs info" terminal
    /// state should add a variant here rather than overload an existing one.
    pub fn from_review_decision(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approve => ConsensusDecision::Approve,
            ReviewDecision::Reject => ConsensusDecision::Reject,
            ReviewDecision::RequestChanges => ConsensusDecision::RequireChanges,
            ReviewDecision::NeedsMoreInfo => ConsensusDecision::NoConsensus,
        }
    }

    /// Returns the decision as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            ConsensusDecision::Approve => "approve",
            ConsensusDecision::Reject => "reject",
            ConsensusDecision::RequireChanges => "require_changes",
            ConsensusDecision::NoConsensus => "no_consensus",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ConsensusDecision::Approve)
    }

    pub fn is_no_consensus(&self) -> bool {
        matches!(self, ConsensusDecision::NoConsensus)
    }
}

impl std::fmt::Display for ConsensusDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_from_review_decisions() {
        assert_eq!(
            ConsensusDecision::from_review_decision(ReviewDecision::Approve),
            ConsensusDecision::Approve
        );
        assert_eq!(
            ConsensusDecision::from_review_decision(ReviewDecision::Reject),
            ConsensusDecision::Reject
        );
        assert_eq!(
            ConsensusDecision::from_review_decision(ReviewDecision::RequestChanges),
            ConsensusDecision::RequireChanges
        );
        // needs_more_info is not a positive outcome
        assert_eq!(
            ConsensusDecision::from_review_decision(ReviewDecision::NeedsMoreInfo),
            ConsensusDecision::NoConsensus
        );
    }

    #[test]
    fn test_predicates() {
        assert!(ConsensusDecision::Approve.is_approved());
        assert!(ConsensusDecision::NoConsensus.is_no_consensus());
        assert!(!ConsensusDecision::Reject.is_approved());
    }
}
