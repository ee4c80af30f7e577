//! Review value objects.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A reviewer's verdict on a proposal.
///
/// The declared variant order is load-bearing: when consensus counting ties,
/// the first variant in this order wins, which keeps the aggregation
/// deterministic regardless of reviewer completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// The proposal is good to apply
    Approve,
    /// The proposal needs revision before it can be applied
    RequestChanges,
    /// The proposal should not be applied
    Reject,
    /// The reviewer cannot judge without more information
    NeedsMoreInfo,
}

impl ReviewDecision {
    /// All decisions in tie-break order.
    pub const ALL: [ReviewDecision; 4] = [
        ReviewDecision::Approve,
        ReviewDecision::RequestChanges,
        ReviewDecision::Reject,
        ReviewDecision::NeedsMoreInfo,
    ];

    /// Returns the decision as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            ReviewDecision::Approve => "approve",
            ReviewDecision::RequestChanges => "request_changes",
            ReviewDecision::Reject => "reject",
            ReviewDecision::NeedsMoreInfo => "needs_more_info",
        }
    }
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReviewDecision {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approve" => Ok(ReviewDecision::Approve),
            "request_changes" => Ok(ReviewDecision::RequestChanges),
            "reject" => Ok(ReviewDecision::Reject),
            "needs_more_info" => Ok(ReviewDecision::NeedsMoreInfo),
            other => Err(DomainError::unknown("review decision", other)),
        }
    }
}

/// How serious a review comment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// What aspect a review comment is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    Correctness,
    Style,
    Security,
    Performance,
    Testing,
    Design,
}

/// Outcome of one sandboxed test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    /// The sandbox itself failed; the test verdict is unknown
    Error,
}

impl TestStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_round_trip() {
        for decision in ReviewDecision::ALL {
            assert_eq!(
                decision.as_str().parse::<ReviewDecision>().unwrap(),
                decision
            );
        }
        assert!("veto".parse::<ReviewDecision>().is_err());
    }

    #[test]
    fn test_tie_break_order() {
        // Approve outranks everything else when counts tie
        assert_eq!(ReviewDecision::ALL[0], ReviewDecision::Approve);
        assert_eq!(ReviewDecision::ALL[3], ReviewDecision::NeedsMoreInfo);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(CommentSeverity::Critical > CommentSeverity::Info);
    }
}
