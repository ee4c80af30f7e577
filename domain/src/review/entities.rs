//! Review entities.

use super::value_objects::{CommentKind, CommentSeverity, ReviewDecision, TestStatus};
use crate::agent::value_objects::AgentId;
use crate::core::time::current_timestamp;
use crate::proposal::value_objects::ProposalId;
use serde::{Deserialize, Serialize};

/// A structured remark a reviewer attaches to its verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    /// How serious the remark is
    pub severity: CommentSeverity,
    /// What aspect it concerns
    pub kind: CommentKind,
    /// The remark itself
    pub message: String,
    /// File the remark points at, when specific
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Line the remark points at, when specific
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl ReviewComment {
    pub fn new(severity: CommentSeverity, kind: CommentKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            path: None,
            line: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>, line: u32) -> Self {
        self.path = Some(path.into());
        self.line = Some(line);
        self
    }
}

/// Outcome of one test case run in the sandbox during review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Test name
    pub name: String,
    /// Verdict
    pub status: TestStatus,
    /// Command that was run
    pub command: String,
    /// Exit code, when the command ran at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Captured output
    pub output: String,
    /// Sandbox or command error, when status is Error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestCaseResult {
    pub fn passed(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            command: command.into(),
            exit_code: Some(0),
            output: String::new(),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, command: impl Into<String>, exit_code: i32) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            command: command.into(),
            exit_code: Some(exit_code),
            output: String::new(),
            error: None,
        }
    }

    /// The sandbox could not run the test; the verdict is unknown.
    pub fn errored(
        name: impl Into<String>,
        command: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Error,
            command: command.into(),
            exit_code: None,
            output: String::new(),
            error: Some(error.into()),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }
}

/// Aggregated sandbox outcome embedded in a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Overall status: Passed only when every case passed
    pub status: TestStatus,
    /// Per-case outcomes
    pub results: Vec<TestCaseResult>,
    /// Total sandbox wall-clock time in milliseconds
    pub duration_ms: u64,
}

impl TestReport {
    /// Aggregate per-case outcomes into a report.
    ///
    /// Any `Error` case makes the report `Error`; otherwise any `Failed`
    /// case makes it `Failed`; otherwise it is `Passed`.
    pub fn from_results(results: Vec<TestCaseResult>, duration_ms: u64) -> Self {
        let status = if results.iter().any(|r| r.status == TestStatus::Error) {
            TestStatus::Error
        } else if results.iter().any(|r| r.status == TestStatus::Failed) {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        };
        Self {
            status,
            results,
            duration_ms,
        }
    }
}

/// One reviewer's verdict on a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    /// The proposal under review
    pub proposal_id: ProposalId,
    /// The reviewer that produced this verdict
    pub reviewer: AgentId,
    /// The verdict
    pub decision: ReviewDecision,
    /// Quality score in [0, 1]
    pub score: f64,
    /// Reviewer confidence in its own verdict, in [0, 1]
    pub confidence: f64,
    /// Structured remarks
    #[serde(default)]
    pub comments: Vec<ReviewComment>,
    /// Free-form improvement suggestions
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Sandbox outcome, when the reviewer ran the proposal's tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_report: Option<TestReport>,
    /// The reviewer's reasoning
    pub reasoning: String,
    /// Completion timestamp (milliseconds since epoch)
    pub timestamp: u64,
}

impl ReviewResult {
    pub fn new(proposal_id: ProposalId, reviewer: AgentId, decision: ReviewDecision) -> Self {
        Self {
            proposal_id,
            reviewer,
            decision,
            score: 0.5,
            confidence: 0.5,
            comments: Vec::new(),
            suggestions: Vec::new(),
            test_report: None,
            reasoning: String::new(),
            timestamp: current_timestamp(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score.clamp(0.0, 1.0);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_comment(mut self, comment: ReviewComment) -> Self {
        self.comments.push(comment);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_test_report(mut self, report: TestReport) -> Self {
        self.test_report = Some(report);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn is_approval(&self) -> bool {
        matches!(self.decision, ReviewDecision::Approve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_builder() {
        let review = ReviewResult::new("p-1".into(), "rev-1".into(), ReviewDecision::Approve)
            .with_score(0.9)
            .with_confidence(0.8)
            .with_comment(
                ReviewComment::new(
                    CommentSeverity::Info,
                    CommentKind::Style,
                    "prefer iterators here",
                )
                .at("src/lib.rs", 42),
            )
            .with_suggestion("add a regression test");

        assert!(review.is_approval());
        assert_eq!(review.score, 0.9);
        assert_eq!(review.comments.len(), 1);
        assert_eq!(review.comments[0].line, Some(42));
        assert_eq!(review.suggestions.len(), 1);
    }

    #[test]
    fn test_scores_clamped() {
        let review = ReviewResult::new("p".into(), "r".into(), ReviewDecision::Reject)
            .with_score(2.0)
            .with_confidence(-1.0);
        assert_eq!(review.score, 1.0);
        assert_eq!(review.confidence, 0.0);
    }

    #[test]
    fn test_report_aggregation() {
        let report = TestReport::from_results(
            vec![
                TestCaseResult::passed("a", "cargo test a"),
                TestCaseResult::failed("b", "cargo test b", 101),
            ],
            1500,
        );
        assert_eq!(report.status, TestStatus::Failed);

        let report = TestReport::from_results(
            vec![
                TestCaseResult::passed("a", "x"),
                TestCaseResult::errored("b", "y", "sandbox unavailable"),
            ],
            10,
        );
        assert_eq!(report.status, TestStatus::Error);

        let report = TestReport::from_results(vec![TestCaseResult::passed("a", "x")], 5);
        assert!(report.status.is_passed());
    }
}
