//! Proposal entities.

use super::value_objects::{ChangeKind, ImpactScope, ProposalId, ProposalKind, RiskLevel};
use crate::agent::value_objects::AgentId;
use crate::core::time::current_timestamp;
use serde::{Deserialize, Serialize};

/// One file operation inside a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    /// Operation performed
    pub kind: ChangeKind,
    /// Path the operation applies to
    pub path: String,
    /// Previous content, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
    /// Content after the change (empty for deletions)
    pub new_content: String,
    /// First affected line, when the change is a partial edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    /// Last affected line, when the change is a partial edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
}

impl Change {
    pub fn new(kind: ChangeKind, path: impl Into<String>, new_content: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            old_content: None,
            new_content: new_content.into(),
            start_line: None,
            end_line: None,
        }
    }

    pub fn with_old_content(mut self, old: impl Into<String>) -> Self {
        self.old_content = Some(old.into());
        self
    }

    pub fn with_lines(mut self, start: u32, end: u32) -> Self {
        self.start_line = Some(start);
        self.end_line = Some(end);
        self
    }
}

/// Author-estimated consequences of applying a proposal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Impact {
    /// How far the change reaches
    #[serde(default)]
    pub scope: ImpactScope,
    /// How risky the change is
    #[serde(default)]
    pub risk: RiskLevel,
    /// What the change improves
    #[serde(default)]
    pub benefits: Vec<String>,
    /// What the change costs
    #[serde(default)]
    pub drawbacks: Vec<String>,
    /// Other changes this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Impact {
    pub fn new(scope: ImpactScope, risk: RiskLevel) -> Self {
        Self {
            scope,
            risk,
            ..Default::default()
        }
    }

    pub fn with_benefit(mut self, benefit: impl Into<String>) -> Self {
        self.benefits.push(benefit.into());
        self
    }

    pub fn with_drawback(mut self, drawback: impl Into<String>) -> Self {
        self.drawbacks.push(drawback.into());
        self
    }
}

/// A test the author suggests running to validate the proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Test name
    pub name: String,
    /// What the test checks
    pub description: String,
    /// Command to run it, when the author knows one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl TestCase {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// A candidate set of file changes with the author's reasoning.
///
/// Emitted by a lead agent, judged by reviewer agents, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique identifier
    pub id: ProposalId,
    /// The agent that authored this proposal
    pub author: AgentId,
    /// What shape of change this is
    pub kind: ProposalKind,
    /// Human-readable summary
    pub description: String,
    /// The file operations, in application order
    pub changes: Vec<Change>,
    /// The author's reasoning for the approach
    pub reasoning: String,
    /// Author confidence in [0, 1]
    pub confidence: f64,
    /// Estimated consequences
    pub impact: Impact,
    /// Tests the author suggests for validation
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    /// Creation timestamp (milliseconds since epoch)
    pub created_at: u64,
}

impl Proposal {
    pub fn new(author: AgentId, kind: ProposalKind, description: impl Into<String>) -> Self {
        Self {
            id: ProposalId::generate(),
            author,
            kind,
            description: description.into(),
            changes: Vec::new(),
            reasoning: String::new(),
            confidence: 0.5,
            impact: Impact::default(),
            test_cases: Vec::new(),
            created_at: current_timestamp(),
        }
    }

    pub fn with_id(mut self, id: impl Into<ProposalId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    pub fn with_test_case(mut self, test_case: TestCase) -> Self {
        self.test_cases.push(test_case);
        self
    }

    /// The set of paths this proposal touches, in change order.
    pub fn touched_paths(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }
}
