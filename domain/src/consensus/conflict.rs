//! Conflict and resolution records.

use crate::agent::value_objects::AgentId;
use crate::core::error::DomainError;
use crate::core::time::current_timestamp;
use serde::{Deserialize, Serialize};

/// What kind of disagreement a conflict records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Reviewers reached different verdicts
    Decision,
    /// Reviewers want different overall approaches
    Approach,
    /// Reviewers disagree on implementation details
    Implementation,
    /// Reviewers weight concerns differently
    Priority,
}

/// How serious a conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// A structured record of disagreement among reviewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// What kind of disagreement this is
    pub kind: ConflictKind,
    /// The agents on the losing side of the disagreement, sorted by id
    pub involved: Vec<AgentId>,
    /// Human-readable description
    pub description: String,
    /// How serious it is
    pub severity: ConflictSeverity,
}

impl Conflict {
    /// Create a conflict. Involved ids are sorted so two conflicts built
    /// from the same reviewers compare equal regardless of arrival order.
    pub fn new(
        kind: ConflictKind,
        mut involved: Vec<AgentId>,
        description: impl Into<String>,
        severity: ConflictSeverity,
    ) -> Self {
        involved.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Self {
            kind,
            involved,
            description: description.into(),
            severity,
        }
    }
}

/// Strategy for settling reviewer disagreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Recount the votes and let the majority stand
    #[default]
    Voting,
    /// Defer to the agents with the most relevant expertise
    ExpertRule,
    /// Record a compromise between the positions
    Compromise,
    /// Let the lead agent arbitrate
    Arbitration,
}

impl ResolutionMethod {
    /// Returns the method as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            ResolutionMethod::Voting => "voting",
            ResolutionMethod::ExpertRule => "expert_rule",
            ResolutionMethod::Compromise => "compromise",
            ResolutionMethod::Arbitration => "arbitration",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResolutionMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "voting" => Ok(ResolutionMethod::Voting),
            "expert_rule" => Ok(ResolutionMethod::ExpertRule),
            "compromise" => Ok(ResolutionMethod::Compromise),
            "arbitration" => Ok(ResolutionMethod::Arbitration),
            other => Err(DomainError::unknown("resolution method", other)),
        }
    }
}

/// How a round's conflicts were (or were deemed) settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// The method that was applied
    pub method: ResolutionMethod,
    /// What the resolution concluded
    pub description: String,
    /// Why the resolution stands
    pub rationale: String,
    /// The agent (or orchestrator) that resolved
    pub resolver: AgentId,
    /// Resolution timestamp (milliseconds since epoch)
    pub timestamp: u64,
}

impl Resolution {
    pub fn new(
        method: ResolutionMethod,
        description: impl Into<String>,
        rationale: impl Into<String>,
        resolver: AgentId,
    ) -> Self {
        Self {
            method,
            description: description.into(),
            rationale: rationale.into(),
            resolver,
            timestamp: current_timestamp(),
        }
    }
}
