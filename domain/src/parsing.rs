//! Model response parsing.
//!
//! These functions extract structured proposals and review verdicts from
//! free-form LLM responses. They are pure domain logic — no I/O, no session
//! management, just JSON extraction with conservative text fallbacks.
//!
//! # Functions
//!
//! | Function | Use Case | Preferred format |
//! |----------|----------|------------------|
//! | [`parse_proposals`] | Lead output | `{"proposals": [...]}` |
//! | [`parse_review`] | Reviewer verdict | `{"decision": ..., "score": ...}` |

use crate::agent::value_objects::AgentId;
use crate::proposal::entities::{Change, Impact, Proposal, TestCase};
use crate::proposal::value_objects::ProposalKind;
use crate::review::entities::ReviewComment;
use crate::review::value_objects::ReviewDecision;

/// Locate and parse the outermost JSON object embedded in a response.
///
/// Models frequently wrap JSON in prose or markdown fences; this scans from
/// the first `{` to the last `}` and tries to parse that slice.
fn extract_json(response: &str) -> Option<serde_json::Value> {
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    serde_json::from_str(&response[start..start + end + 1]).ok()
}

/// Parse a lead response into proposals.
///
/// Returns an empty list when the response carries no structured proposals;
/// a lead may legitimately answer a task in prose alone.
pub fn parse_proposals(response: &str, author: &AgentId) -> Vec<Proposal> {
    let Some(value) = extract_json(response) else {
        return Vec::new();
    };
    let Some(entries) = value.get("proposals").and_then(|p| p.as_array()) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| parse_proposal(entry, author))
        .collect()
}

fn parse_proposal(entry: &serde_json::Value, author: &AgentId) -> Option<Proposal> {
    let description = entry.get("description")?.as_str()?.to_string();

    let kind = entry
        .get("kind")
        .and_then(|k| serde_json::from_value::<ProposalKind>(k.clone()).ok())
        .unwrap_or(ProposalKind::FileChange);

    let mut proposal = Proposal::new(author.clone(), kind, description);

    if let Some(changes) = entry.get("changes").and_then(|c| c.as_array()) {
        for change in changes {
            if let Ok(change) = serde_json::from_value::<Change>(change.clone()) {
                proposal = proposal.with_change(change);
            }
        }
    }

    if let Some(reasoning) = entry.get("reasoning").and_then(|r| r.as_str()) {
        proposal = proposal.with_reasoning(reasoning);
    }

    if let Some(confidence) = entry.get("confidence").and_then(|c| c.as_f64()) {
        proposal = proposal.with_confidence(confidence);
    }

    if let Some(impact) = entry
        .get("impact")
        .and_then(|i| serde_json::from_value::<Impact>(i.clone()).ok())
    {
        proposal = proposal.with_impact(impact);
    }

    if let Some(tests) = entry.get("test_cases").and_then(|t| t.as_array()) {
        for test in tests {
            if let Ok(test) = serde_json::from_value::<TestCase>(test.clone()) {
                proposal = proposal.with_test_case(test);
            }
        }
    }

    Some(proposal)
}

/// A reviewer verdict extracted from a model response.
#[derive(Debug, Clone)]
pub struct ParsedReview {
    pub decision: ReviewDecision,
    pub score: f64,
    pub confidence: f64,
    pub comments: Vec<ReviewComment>,
    pub suggestions: Vec<String>,
    pub reasoning: String,
}

/// Parse a reviewer response into a verdict.
///
/// Prefers an embedded JSON object; falls back to a conservative keyword
/// scan. Ambiguity maps to `needs_more_info`, never to approval.
pub fn parse_review(response: &str) -> ParsedReview {
    if let Some(value) = extract_json(response)
        && let Some(decision) = value
            .get("decision")
            .and_then(|d| serde_json::from_value::<ReviewDecision>(d.clone()).ok())
    {
        let comments = value
            .get("comments")
            .and_then(|c| c.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|c| serde_json::from_value::<ReviewComment>(c.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let suggestions = value
            .get("suggestions")
            .and_then(|s| serde_json::from_value::<Vec<String>>(s.clone()).ok())
            .unwrap_or_default();

        let reasoning = value
            .get("reasoning")
            .and_then(|r| r.as_str())
            .unwrap_or(response)
            .to_string();

        return ParsedReview {
            decision,
            score: clamped(value.get("score"), 0.5),
            confidence: clamped(value.get("confidence"), 0.5),
            comments,
            suggestions,
            reasoning,
        };
    }

    ParsedReview {
        decision: decision_from_keywords(response),
        score: 0.5,
        confidence: 0.5,
        comments: Vec::new(),
        suggestions: Vec::new(),
        reasoning: response.to_string(),
    }
}

fn clamped(value: Option<&serde_json::Value>, fallback: f64) -> f64 {
    value
        .and_then(|v| v.as_f64())
        .unwrap_or(fallback)
        .clamp(0.0, 1.0)
}

/// Conservative keyword scan for responses without usable JSON.
fn decision_from_keywords(response: &str) -> ReviewDecision {
    let upper = response.to_uppercase();

    let rejected = upper.contains("REJECT")
        || upper.contains("NOT APPROVE")
        || upper.contains("CANNOT APPROVE")
        || upper.contains("DON'T APPROVE");
    let wants_changes = upper.contains("REQUEST CHANGES")
        || upper.contains("REQUEST_CHANGES")
        || upper.contains("REVISE");
    let approved = upper.contains("APPROVE") && !rejected;

    if rejected {
        ReviewDecision::Reject
    } else if wants_changes {
        ReviewDecision::RequestChanges
    } else if approved {
        ReviewDecision::Approve
    } else {
        ReviewDecision::NeedsMoreInfo
    }
}
