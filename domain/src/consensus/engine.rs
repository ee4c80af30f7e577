//! Consensus engine - pure aggregation of reviews into one verdict.
//!
//! [`evaluate`] is a pure function: same reviews in, same verdict out, in
//! any order. The review dispatcher returns results in completion order,
//! which is non-deterministic, so everything here is built from counts,
//! means, and a fixed tie-break order.

use super::conflict::{Conflict, ConflictKind, ConflictSeverity, Resolution, ResolutionMethod};
use super::decision::ConsensusDecision;
use super::gate::QualityGate;
use crate::agent::value_objects::AgentId;
use crate::review::entities::ReviewResult;
use crate::review::value_objects::ReviewDecision;
use std::collections::HashMap;

/// The order-invariant fragment of a consensus result.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusEvaluation {
    /// The verdict of the round
    pub decision: ConsensusDecision,
    /// Mean reviewer score, regardless of the verdict
    pub score: f64,
    /// Disagreements detected during aggregation
    pub conflicts: Vec<Conflict>,
}

impl ConsensusEvaluation {
    fn no_reviews() -> Self {
        Self {
            decision: ConsensusDecision::NoConsensus,
            score: 0.0,
            conflicts: Vec::new(),
        }
    }
}

/// Count decisions and pick the majority.
///
/// Ties are broken by the declared order of [`ReviewDecision`]: the first
/// variant with the maximal count wins. Returns `None` for an empty bag.
pub fn majority_decision(reviews: &[ReviewResult]) -> Option<(ReviewDecision, usize)> {
    if reviews.is_empty() {
        return None;
    }

    let mut counts: HashMap<ReviewDecision, usize> = HashMap::new();
    for review in reviews {
        *counts.entry(review.decision).or_default() += 1;
    }

    // Scan candidates in enumeration order so ties resolve deterministically.
    let mut best: Option<(ReviewDecision, usize)> = None;
    for decision in ReviewDecision::ALL {
        let count = counts.get(&decision).copied().unwrap_or(0);
        if count > 0 && best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((decision, count));
        }
    }
    best
}

/// Reduce a bag of reviews to a verdict under the threshold and quality gate.
///
/// The returned score is the mean reviewer score regardless of the verdict.
pub fn evaluate(reviews: &[ReviewResult], threshold: f64, gate: &QualityGate) -> ConsensusEvaluation {
    let Some((majority, count)) = majority_decision(reviews) else {
        return ConsensusEvaluation::no_reviews();
    };

    let total = reviews.len();
    let avg_score = reviews.iter().map(|r| r.score).sum::<f64>() / total as f64;
    let avg_confidence = reviews.iter().map(|r| r.confidence).sum::<f64>() / total as f64;
    let ratio = count as f64 / total as f64;

    // A round that lost reviewers to timeouts or failures can fall below the
    // quorum; it degrades to NoConsensus rather than erroring.
    if total < gate.min_reviewers {
        return ConsensusEvaluation {
            decision: ConsensusDecision::NoConsensus,
            score: avg_score,
            conflicts: Vec::new(),
        };
    }

    let mut conflicts = Vec::new();
    let mut decision = if ratio >= threshold {
        ConsensusDecision::from_review_decision(majority)
    } else {
        let distinct = reviews
            .iter()
            .filter(|r| r.decision != majority)
            .collect::<Vec<_>>();
        if !distinct.is_empty() {
            let involved: Vec<AgentId> = distinct.iter().map(|r| r.reviewer.clone()).collect();
            conflicts.push(Conflict::new(
                ConflictKind::Decision,
                involved,
                format!(
                    "Decision split: majority '{}' holds {}/{} reviews, ratio {:.2} below threshold {:.2}",
                    majority, count, total, ratio, threshold
                ),
                ConflictSeverity::Warning,
            ));
        }
        ConsensusDecision::NoConsensus
    };

    // Quality gate: low collective confidence overrides any verdict.
    if avg_confidence < gate.min_confidence {
        decision = ConsensusDecision::NoConsensus;
        let involved: Vec<AgentId> = reviews.iter().map(|r| r.reviewer.clone()).collect();
        conflicts.push(Conflict::new(
            ConflictKind::Decision,
            involved,
            format!(
                "Low confidence: {:.2} < {:.2}",
                avg_confidence, gate.min_confidence
            ),
            ConflictSeverity::Warning,
        ));
    }

    ConsensusEvaluation {
        decision,
        score: avg_score,
        conflicts,
    }
}

/// Apply the configured conflict-resolution method.
///
/// Only `voting` recomputes anything; the other methods produce
/// annotation-only resolutions. Promoting them to behavioral changes is an
/// extension point.
pub fn resolve_conflicts(
    method: ResolutionMethod,
    reviews: &[ReviewResult],
    resolver: AgentId,
) -> Resolution {
    match method {
        ResolutionMethod::Voting => {
            let (decision, count) =
                majority_decision(reviews).unwrap_or((ReviewDecision::NeedsMoreInfo, 0));
            Resolution::new(
                method,
                "Majority vote over all submitted reviews",
                format!("Resolved by majority vote: {} ({} votes)", decision, count),
                resolver,
            )
        }
        ResolutionMethod::ExpertRule => Resolution::new(
            method,
            "Expert-rule annotation",
            "Deferred to agents with higher expertise",
            resolver,
        ),
        ResolutionMethod::Compromise => Resolution::new(
            method,
            "Compromise annotation",
            "Recorded a compromise between reviewer positions; the round's decision stands",
            resolver,
        ),
        ResolutionMethod::Arbitration => Resolution::new(
            method,
            "Arbitration annotation",
            "Lead agent arbitrated the disagreement",
            resolver,
        ),
    }
}
