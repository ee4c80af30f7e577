//! Agent factory - builds agents from configuration profiles.

use super::lead::LeadAgent;
use super::reviewer::ReviewerAgent;
use super::{Agent, merge_capabilities};
use crate::config::{AgentProfile, OrchestrationConfig};
use crate::error::{ConfigError, OrchestrationError};
use crate::ports::prompt_runner::RunnerGateway;
use crate::ports::sandbox::Sandbox;
use concord_domain::{AgentRole, Capability, Specialization};
use std::sync::Arc;
use tracing::debug;

/// Capabilities every lead holds regardless of configuration.
const LEAD_INTRINSIC: [Capability; 3] = [
    Capability::CodeGeneration,
    Capability::Refactoring,
    Capability::Documentation,
];

/// Capabilities every reviewer holds regardless of configuration.
const REVIEWER_INTRINSIC: [Capability; 1] = [Capability::CodeReview];

/// Builds agents from [`AgentProfile`]s, binding each to the runner its
/// profile names.
///
/// Runner resolution failures propagate as model errors and the agent is
/// not created.
pub struct AgentFactory {
    gateway: Arc<dyn RunnerGateway>,
    sandbox: Option<Arc<dyn Sandbox>>,
}

impl AgentFactory {
    pub fn new(gateway: Arc<dyn RunnerGateway>) -> Self {
        Self {
            gateway,
            sandbox: None,
        }
    }

    /// Attach a sandbox handed to every reviewer built by this factory.
    pub fn with_sandbox(mut self, sandbox: Arc<dyn Sandbox>) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Build one agent from its profile. The profile name becomes the
    /// agent id.
    pub fn build(
        &self,
        name: &str,
        profile: &AgentProfile,
    ) -> Result<Arc<dyn Agent>, OrchestrationError> {
        let runner = self.gateway.resolve(&profile.model)?;
        debug!(
            "Building {} agent '{}' bound to model {}",
            profile.role, name, profile.model
        );

        match profile.role {
            AgentRole::Lead => {
                let capabilities =
                    merge_capabilities(&LEAD_INTRINSIC, &profile.capabilities, None);
                Ok(Arc::new(LeadAgent::new(name, capabilities, runner)))
            }
            AgentRole::Reviewer => {
                let specialization = profile.specialization.unwrap_or_default();
                Ok(self.build_reviewer(name, AgentRole::Reviewer, profile, specialization, runner))
            }
            AgentRole::Expert => {
                let specialization = profile
                    .specialization
                    .ok_or_else(|| ConfigError::MissingSpecialization(name.to_string()))?;
                Ok(self.build_reviewer(name, AgentRole::Expert, profile, specialization, runner))
            }
        }
    }

    fn build_reviewer(
        &self,
        name: &str,
        role: AgentRole,
        profile: &AgentProfile,
        specialization: Specialization,
        runner: Arc<dyn crate::ports::prompt_runner::PromptRunner>,
    ) -> Arc<dyn Agent> {
        let capabilities = merge_capabilities(
            &REVIEWER_INTRINSIC,
            &profile.capabilities,
            specialization.granted_capability(),
        );
        let mut reviewer = ReviewerAgent::new(name, role, capabilities, specialization, runner);
        if let Some(sandbox) = &self.sandbox {
            reviewer = reviewer.with_sandbox(Arc::clone(sandbox));
        }
        Arc::new(reviewer)
    }

    /// Build every enabled profile, in sorted-name order.
    pub fn build_all(
        &self,
        config: &OrchestrationConfig,
    ) -> Result<Vec<Arc<dyn Agent>>, OrchestrationError> {
        let mut agents = Vec::new();
        for (name, profile) in config.enabled_profiles() {
            agents.push(self.build(name, profile)?);
        }
        Ok(agents)
    }
}
