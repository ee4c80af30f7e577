//! Prompt runner port
//!
//! Defines the interface for model completions. The core does no model-level
//! retries; transient-failure handling belongs to the provider behind this
//! port.

use async_trait::async_trait;
use concord_domain::task::entities::FileContext;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while running a prompt
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Input for one model completion.
#[derive(Debug, Clone, Default)]
pub struct PromptRequest {
    /// System prompt
    pub system_prompt: String,
    /// User prompt
    pub user_prompt: String,
    /// Completion budget in tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// Files shipped alongside the prompt
    pub files: Vec<FileContext>,
    /// Prior memory entries
    pub memory: Vec<String>,
    /// Free-form metadata forwarded to the provider
    pub metadata: HashMap<String, String>,
}

impl PromptRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: 4096,
            temperature: 0.2,
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_files(mut self, files: Vec<FileContext>) -> Self {
        self.files = files;
        self
    }

    pub fn with_memory(mut self, memory: Vec<String>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Output of one model completion.
#[derive(Debug, Clone)]
pub struct PromptOutput {
    /// The model's response text
    pub response: String,
    /// Tokens consumed by the completion
    pub tokens_used: u32,
    /// The model that answered
    pub model_name: String,
    /// Free-form provider metadata
    pub metadata: HashMap<String, String>,
}

impl PromptOutput {
    pub fn new(model_name: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            tokens_used: 0,
            model_name: model_name.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_tokens_used(mut self, tokens_used: u32) -> Self {
        self.tokens_used = tokens_used;
        self
    }
}

/// A bound model target that can run prompts.
///
/// Implementations must honour cancellation of the surrounding scope; the
/// core bounds every call with a deadline and signals cooperatively.
#[async_trait]
pub trait PromptRunner: Send + Sync {
    /// The model this runner is bound to
    fn model_name(&self) -> &str;

    /// Run one completion
    async fn run(&self, request: &PromptRequest) -> Result<PromptOutput, RunnerError>;
}

/// Resolves model references from agent profiles to bound runners.
///
/// Resolution failures propagate as model errors; the factory does not
/// create an agent whose model cannot be resolved.
pub trait RunnerGateway: Send + Sync {
    fn resolve(&self, model: &str) -> Result<Arc<dyn PromptRunner>, RunnerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = PromptRequest::new("system", "user")
            .with_max_tokens(512)
            .with_temperature(0.7)
            .with_metadata("agent", "lead-1");

        assert_eq!(request.system_prompt, "system");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.metadata.get("agent").unwrap(), "lead-1");
    }

    #[test]
    fn test_output_builder() {
        let output = PromptOutput::new("test-model", "hello").with_tokens_used(12);
        assert_eq!(output.model_name, "test-model");
        assert_eq!(output.tokens_used, 12);
    }
}
