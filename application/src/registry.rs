//! Agent registry - registration-ordered agent lookup.

use crate::agents::Agent;
use crate::error::{ConfigError, InputError, OrchestrationError};
use concord_domain::{AgentId, AgentRole, Capability};
use std::collections::HashMap;
use std::sync::Arc;

/// Orderless id → agent mapping with two derived views.
///
/// Iteration order is registration order. That order is observable: the
/// first registered lead handles tasks, and reviewer truncation keeps the
/// earliest-registered reviewers, so it must stay deterministic.
pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
    index: HashMap<AgentId, usize>,
    capacity: usize,
}

impl AgentRegistry {
    /// Create a registry bounded by `capacity` agents.
    pub fn new(capacity: usize) -> Self {
        Self {
            agents: Vec::new(),
            index: HashMap::new(),
            capacity,
        }
    }

    /// Register an agent.
    ///
    /// Fails with a config error at capacity and an input error on a
    /// duplicate id; neither changes the registry.
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> Result<(), OrchestrationError> {
        if self.agents.len() >= self.capacity {
            return Err(ConfigError::AgentLimitReached(self.capacity).into());
        }
        if self.index.contains_key(agent.id()) {
            return Err(InputError::DuplicateAgent(agent.id().clone()).into());
        }
        self.index.insert(agent.id().clone(), self.agents.len());
        self.agents.push(agent);
        Ok(())
    }

    /// Remove an agent by id. Returns the removed agent, when present.
    pub fn deregister(&mut self, id: &AgentId) -> Option<Arc<dyn Agent>> {
        let position = self.index.remove(id)?;
        let agent = self.agents.remove(position);
        // Positions after the removed slot shift down by one.
        for index in self.index.values_mut() {
            if *index > position {
                *index -= 1;
            }
        }
        Some(agent)
    }

    /// Look up an agent by id.
    pub fn get(&self, id: &AgentId) -> Option<Arc<dyn Agent>> {
        self.index.get(id).map(|&i| Arc::clone(&self.agents[i]))
    }

    /// Registration position of an agent, for deterministic ordering.
    pub fn position(&self, id: &AgentId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Agents with the given role, in registration order.
    pub fn by_role(&self, role: AgentRole) -> Vec<Arc<dyn Agent>> {
        self.agents
            .iter()
            .filter(|a| a.role() == role)
            .map(Arc::clone)
            .collect()
    }

    /// Agents advertising the given capability, in registration order.
    pub fn by_capability(&self, capability: Capability) -> Vec<Arc<dyn Agent>> {
        self.agents
            .iter()
            .filter(|a| a.has_capability(capability))
            .map(Arc::clone)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
