//! Orchestration value objects
//!
//! The terminal result handed back to the caller after a task has run
//! through the lead / review / consensus pipeline.

pub mod value_objects;

pub use value_objects::OrchestrationResult;
