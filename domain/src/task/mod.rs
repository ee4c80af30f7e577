//! Task domain
//!
//! A [`Task`](entities::Task) is the unit of work submitted to the
//! orchestrator: a kind, a description, gathered context, and the
//! constraints the produced proposals must honor. Tasks are immutable once
//! submitted.

pub mod entities;
pub mod value_objects;

pub use entities::{Constraint, FileContext, ProjectInfo, Task, TaskContext};
pub use value_objects::{ConstraintKind, ConstraintSeverity, TaskId, TaskKind, TaskPriority};
