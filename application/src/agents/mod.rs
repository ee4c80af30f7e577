//! Agents - the polymorphic workers of the orchestration.
//!
//! An [`Agent`] either produces work for a task (`execute`) or judges a
//! proposal (`review`). Two built-in kinds exist: [`LeadAgent`](lead::LeadAgent)
//! authors proposals, [`ReviewerAgent`](reviewer::ReviewerAgent) judges them.
//! Specialization is a field on the reviewer, not a subtype; the expert role
//! reuses the reviewer internals.

pub mod factory;
pub mod lead;
pub mod reviewer;

use crate::error::OrchestrationError;
use async_trait::async_trait;
use concord_domain::{
    AgentId, AgentResult, AgentRole, Capability, Proposal, ReviewResult, Specialization, Task,
};

/// A worker that executes tasks and reviews proposals.
///
/// Agents are constructed by the [`AgentFactory`](factory::AgentFactory),
/// registered with the orchestrator, and live until deregistered. They are
/// pure consumers of the [`PromptRunner`](crate::ports::prompt_runner::PromptRunner)
/// and optional [`Sandbox`](crate::ports::sandbox::Sandbox) capabilities.
#[async_trait]
pub trait Agent: Send + Sync + std::fmt::Debug {
    /// Unique identity within the orchestrator
    fn id(&self) -> &AgentId;

    /// The position this agent takes in the orchestration
    fn role(&self) -> AgentRole;

    /// The capabilities this agent advertises
    fn capabilities(&self) -> &[Capability];

    /// Focus area, when the agent has one
    fn specialization(&self) -> Option<Specialization> {
        None
    }

    /// Whether the agent advertises `capability`
    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Produce work for a task.
    ///
    /// Leads accept every task kind. Reviewers reject mutation kinds with a
    /// typed input error and only accept review, analyze, and test tasks.
    async fn execute(&self, task: &Task) -> Result<AgentResult, OrchestrationError>;

    /// Produce a verdict for a proposal.
    async fn review(&self, proposal: &Proposal) -> Result<ReviewResult, OrchestrationError>;
}

/// Merge capability lists, preserving order and dropping duplicates.
pub(crate) fn merge_capabilities(
    intrinsic: &[Capability],
    configured: &[Capability],
    granted: Option<Capability>,
) -> Vec<Capability> {
    let mut capabilities: Vec<Capability> = Vec::new();
    for capability in intrinsic
        .iter()
        .chain(configured.iter())
        .copied()
        .chain(granted)
    {
        if !capabilities.contains(&capability) {
            capabilities.push(capability);
        }
    }
    capabilities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_capabilities_deduplicates() {
        let merged = merge_capabilities(
            &[Capability::CodeReview],
            &[Capability::CodeReview, Capability::Testing],
            Some(Capability::Testing),
        );
        assert_eq!(merged, vec![Capability::CodeReview, Capability::Testing]);
    }

    #[test]
    fn test_merge_capabilities_keeps_order() {
        let merged = merge_capabilities(
            &[Capability::CodeGeneration, Capability::Refactoring],
            &[Capability::Documentation],
            None,
        );
        assert_eq!(
            merged,
            vec![
                Capability::CodeGeneration,
                Capability::Refactoring,
                Capability::Documentation
            ]
        );
    }
}
