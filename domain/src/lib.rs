//! Domain layer for concord
//!
//! This crate contains the core business logic, entities, and value objects
//! of the multi-agent consensus engine. It has no dependencies on the async
//! runtime or on any infrastructure concern: everything in here is pure data
//! plus deterministic functions over it.

pub mod agent;
pub mod consensus;
pub mod core;
pub mod orchestration;
pub mod parsing;
pub mod prompt;
pub mod proposal;
pub mod review;
pub mod task;
pub mod util;

// Re-export commonly used types
pub use agent::{
    result::{AgentResult, Artifact, ArtifactKind, ResultStatus},
    value_objects::{AgentId, AgentRole, Capability, Specialization},
};
pub use consensus::{
    conflict::{Conflict, ConflictKind, ConflictSeverity, Resolution, ResolutionMethod},
    decision::ConsensusDecision,
    engine::{ConsensusEvaluation, evaluate, majority_decision, resolve_conflicts},
    gate::QualityGate,
    result::ConsensusResult,
};
pub use core::error::DomainError;
pub use orchestration::value_objects::OrchestrationResult;
pub use prompt::template::PromptTemplate;
pub use proposal::{
    entities::{Change, Impact, Proposal, TestCase},
    value_objects::{ChangeKind, ImpactScope, ProposalId, ProposalKind, RiskLevel},
};
pub use review::{
    entities::{ReviewComment, ReviewResult, TestCaseResult, TestReport},
    value_objects::{CommentKind, CommentSeverity, ReviewDecision, TestStatus},
};
pub use task::{
    entities::{Constraint, FileContext, ProjectInfo, Task, TaskContext},
    value_objects::{ConstraintKind, ConstraintSeverity, TaskId, TaskKind, TaskPriority},
};
