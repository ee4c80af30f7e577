//! Prompt templates for the built-in agents

pub mod template;

pub use template::PromptTemplate;
