//! Agent identity and results
//!
//! The agent *behavior* (prompting a model, reviewing a proposal) lives in
//! the application layer; this module holds the identity vocabulary — roles,
//! capabilities, specializations — and the [`AgentResult`](result::AgentResult)
//! value an agent invocation produces.

pub mod result;
pub mod value_objects;

pub use result::{AgentResult, Artifact, ArtifactKind, ResultStatus};
pub use value_objects::{AgentId, AgentRole, Capability, Specialization};
