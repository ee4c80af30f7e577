//! Consensus domain
//!
//! This module turns a bag of individual [`ReviewResult`]s into one
//! deterministic verdict.
//!
//! # Core Concepts
//!
//! ## Majority decision
//! Reviewer decisions are counted and the most frequent one wins. Ties are
//! broken by the declared order of [`ReviewDecision`], so the outcome never
//! depends on the order reviews arrived in.
//!
//! ## Quality gate
//! A [`QualityGate`](gate::QualityGate) sets the bar any non-`NoConsensus`
//! decision must clear: enough reviewers, the required capabilities, and a
//! minimum average confidence. A round that fails the gate degrades to
//! `NoConsensus` instead of erroring.
//!
//! ## Conflicts and resolutions
//! Disagreement among reviewers is recorded as [`Conflict`](conflict::Conflict)
//! values, and the configured [`ResolutionMethod`](conflict::ResolutionMethod)
//! produces a [`Resolution`](conflict::Resolution) annotation. Only `voting`
//! recomputes anything; the other methods are annotations by design.
//!
//! [`ReviewResult`]: crate::review::entities::ReviewResult
//! [`ReviewDecision`]: crate::review::value_objects::ReviewDecision

pub mod conflict;
pub mod decision;
pub mod engine;
pub mod gate;
pub mod result;

pub use conflict::{Conflict, ConflictKind, ConflictSeverity, Resolution, ResolutionMethod};
pub use decision::ConsensusDecision;
pub use engine::{ConsensusEvaluation, evaluate, majority_decision, resolve_conflicts};
pub use gate::QualityGate;
pub use result::ConsensusResult;
