//! Proposal domain
//!
//! A [`Proposal`](entities::Proposal) is a candidate set of file changes
//! produced by a lead agent, together with the author's reasoning and
//! confidence. Proposals are immutable once emitted; reviewers judge them,
//! they never edit them.

pub mod entities;
pub mod value_objects;

pub use entities::{Change, Impact, Proposal, TestCase};
pub use value_objects::{ChangeKind, ImpactScope, ProposalId, ProposalKind, RiskLevel};
