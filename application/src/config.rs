//! Orchestration configuration.
//!
//! [`OrchestrationConfig`] groups everything the orchestrator needs to know
//! up front: bounds, timeouts, the consensus policy, the quality gate, and
//! the agent profiles the factory builds from. Validation is fatal before
//! use; a config that does not validate never reaches the orchestrator.

use crate::error::ConfigError;
use concord_domain::{AgentRole, Capability, QualityGate, ResolutionMethod, Specialization};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for one agent the factory should build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// The role the agent takes
    pub role: AgentRole,
    /// Model reference resolved through the runner gateway
    pub model: String,
    /// Capabilities from configuration, merged with the role's intrinsic set
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Focus area; required for experts, defaults to general for reviewers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Specialization>,
    /// Disabled profiles are skipped by the factory
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl AgentProfile {
    pub fn new(role: AgentRole, model: impl Into<String>) -> Self {
        Self {
            role,
            model: model.into(),
            capabilities: Vec::new(),
            specialization: None,
            enabled: true,
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_specialization(mut self, specialization: Specialization) -> Self {
        self.specialization = Some(specialization);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Recognized orchestration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Most agents the registry will hold
    pub max_agents: usize,
    /// Majority ratio a review round must reach, in [0, 1]
    pub consensus_threshold: f64,
    /// How reviewer disagreement is settled
    pub conflict_resolution: ResolutionMethod,
    /// Deadline for one task's lead invocation
    pub task_timeout: Duration,
    /// Deadline for one review round
    pub review_timeout: Duration,
    /// Reserved for callers; the core itself does no model-level retries
    pub max_retries: u32,
    /// Fan reviews out concurrently instead of one at a time
    pub enable_parallel_review: bool,
    /// The bar any non-`no_consensus` decision must clear
    pub quality_gate: QualityGate,
    /// Agent profiles by name
    pub agent_profiles: HashMap<String, AgentProfile>,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        let mut agent_profiles = HashMap::new();
        agent_profiles.insert(
            "lead".to_string(),
            AgentProfile::new(AgentRole::Lead, "default")
                .with_capability(Capability::CodeGeneration)
                .with_capability(Capability::Refactoring),
        );
        agent_profiles.insert(
            "reviewer".to_string(),
            AgentProfile::new(AgentRole::Reviewer, "default")
                .with_capability(Capability::CodeReview)
                .with_capability(Capability::Testing),
        );

        Self {
            max_agents: 5,
            consensus_threshold: 0.7,
            conflict_resolution: ResolutionMethod::Voting,
            task_timeout: Duration::from_secs(600),
            review_timeout: Duration::from_secs(300),
            max_retries: 3,
            enable_parallel_review: true,
            quality_gate: QualityGate::default(),
            agent_profiles,
        }
    }
}

impl OrchestrationConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_agents(mut self, max_agents: usize) -> Self {
        self.max_agents = max_agents;
        self
    }

    pub fn with_consensus_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    pub fn with_conflict_resolution(mut self, method: ResolutionMethod) -> Self {
        self.conflict_resolution = method;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_review_timeout(mut self, timeout: Duration) -> Self {
        self.review_timeout = timeout;
        self
    }

    pub fn with_sequential_review(mut self) -> Self {
        self.enable_parallel_review = false;
        self
    }

    pub fn with_quality_gate(mut self, gate: QualityGate) -> Self {
        self.quality_gate = gate;
        self
    }

    pub fn with_profile(mut self, name: impl Into<String>, profile: AgentProfile) -> Self {
        self.agent_profiles.insert(name.into(), profile);
        self
    }

    pub fn without_profiles(mut self) -> Self {
        self.agent_profiles.clear();
        self
    }

    // ==================== Validation ====================

    /// Check every configuration invariant. Fatal before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_agents == 0 {
            return Err(ConfigError::InvalidMaxAgents);
        }
        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            return Err(ConfigError::InvalidThreshold(self.consensus_threshold));
        }
        if self.task_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("task_timeout"));
        }
        if self.review_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("review_timeout"));
        }
        if !(0.0..=1.0).contains(&self.quality_gate.min_confidence) {
            return Err(ConfigError::InvalidMinConfidence(
                self.quality_gate.min_confidence,
            ));
        }
        if self.quality_gate.min_reviewers > self.quality_gate.max_reviewers {
            return Err(ConfigError::ReviewerBoundsInverted {
                min: self.quality_gate.min_reviewers,
                max: self.quality_gate.max_reviewers,
            });
        }

        let mut has_lead = false;
        for (name, profile) in &self.agent_profiles {
            if !profile.enabled {
                continue;
            }
            if profile.model.trim().is_empty() {
                return Err(ConfigError::MissingModel(name.clone()));
            }
            if profile.role == AgentRole::Expert && profile.specialization.is_none() {
                return Err(ConfigError::MissingSpecialization(name.clone()));
            }
            if profile.role == AgentRole::Lead {
                has_lead = true;
            }
        }
        if !has_lead {
            return Err(ConfigError::NoLeadProfile);
        }

        Ok(())
    }

    /// Profiles in deterministic (sorted-name) order, enabled only.
    pub fn enabled_profiles(&self) -> Vec<(&String, &AgentProfile)> {
        let mut profiles: Vec<_> = self
            .agent_profiles
            .iter()
            .filter(|(_, p)| p.enabled)
            .collect();
        profiles.sort_by_key(|(name, _)| name.as_str());
        profiles
    }
}
