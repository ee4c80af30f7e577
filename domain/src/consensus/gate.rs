//! Quality gate - the bar a review round must clear.

use crate::agent::value_objects::{AgentId, Capability};
use serde::{Deserialize, Serialize};

/// Minimum bar that must hold for any non-`NoConsensus` decision.
///
/// The gate bounds both who reviews (capabilities, reviewer counts) and how
/// sure they must collectively be (average confidence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityGate {
    /// Minimum average reviewer confidence, in [0, 1]
    pub min_confidence: f64,
    /// Capabilities every selected reviewer must hold
    pub required_capabilities: Vec<Capability>,
    /// Reviewers that are always included when registered
    pub mandatory_reviewers: Vec<AgentId>,
    /// Fewest reviewers a round may run with
    pub min_reviewers: usize,
    /// Most reviewers a round will use
    pub max_reviewers: usize,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self {
            min_confidence: 0.8,
            required_capabilities: vec![Capability::CodeReview],
            mandatory_reviewers: Vec::new(),
            min_reviewers: 2,
            max_reviewers: 4,
        }
    }
}

impl QualityGate {
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_reviewer_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_reviewers = min;
        self.max_reviewers = max;
        self
    }

    pub fn with_required_capability(mut self, capability: Capability) -> Self {
        self.required_capabilities.push(capability);
        self
    }

    pub fn with_mandatory_reviewer(mut self, id: impl Into<AgentId>) -> Self {
        self.mandatory_reviewers.push(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let gate = QualityGate::default();
        assert_eq!(gate.min_confidence, 0.8);
        assert_eq!(gate.required_capabilities, vec![Capability::CodeReview]);
        assert!(gate.mandatory_reviewers.is_empty());
        assert_eq!(gate.min_reviewers, 2);
        assert_eq!(gate.max_reviewers, 4);
    }

    #[test]
    fn test_builder() {
        let gate = QualityGate::default()
            .with_min_confidence(0.5)
            .with_reviewer_bounds(1, 3)
            .with_mandatory_reviewer("security-expert");
        assert_eq!(gate.min_confidence, 0.5);
        assert_eq!(gate.min_reviewers, 1);
        assert_eq!(gate.max_reviewers, 3);
        assert_eq!(gate.mandatory_reviewers.len(), 1);
    }
}
