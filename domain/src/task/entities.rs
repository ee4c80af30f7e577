//! Task entities - the immutable unit of work.

use super::value_objects::{ConstraintKind, ConstraintSeverity, TaskId, TaskKind, TaskPriority};
use crate::core::error::DomainError;
use crate::core::time::current_timestamp;
use serde::{Deserialize, Serialize};

/// A source file handed to the agents as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContext {
    /// Path relative to the project root
    pub path: String,
    /// Full file content
    pub content: String,
    /// Language tag (e.g., "rust", "python")
    pub language: String,
    /// Why this file is part of the context
    pub purpose: String,
    /// Whether this file is the target of the task
    pub is_target: bool,
    /// Whether this file is reference material only
    pub is_reference: bool,
}

impl FileContext {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            language: language.into(),
            purpose: String::new(),
            is_target: false,
            is_reference: false,
        }
    }

    /// Mark this file as the target of the task.
    pub fn as_target(mut self, purpose: impl Into<String>) -> Self {
        self.is_target = true;
        self.purpose = purpose.into();
        self
    }

    /// Mark this file as reference material.
    pub fn as_reference(mut self, purpose: impl Into<String>) -> Self {
        self.is_reference = true;
        self.purpose = purpose.into();
        self
    }
}

/// Project metadata included in the task context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project name
    pub name: String,
    /// Primary language
    pub language: String,
    /// Short description of the project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectInfo {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Everything an agent gets to see about the task beyond its description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskContext {
    /// Files relevant to the task, in the order the caller supplied them
    pub files: Vec<FileContext>,
    /// Requirement statements the result must satisfy
    pub requirements: Vec<String>,
    /// Optional worked examples
    pub examples: Vec<String>,
    /// Project metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectInfo>,
    /// Prior memory entries supplied by the caller
    pub memory: Vec<String>,
}

impl TaskContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: FileContext) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirements.push(requirement.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn with_project(mut self, project: ProjectInfo) -> Self {
        self.project = Some(project);
        self
    }

    pub fn with_memory(mut self, entry: impl Into<String>) -> Self {
        self.memory.push(entry.into());
        self
    }

    /// The files the task is expected to change.
    pub fn target_files(&self) -> impl Iterator<Item = &FileContext> {
        self.files.iter().filter(|f| f.is_target)
    }
}

/// A restriction the produced proposals must honor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    /// Category of the constraint
    pub kind: ConstraintKind,
    /// Human-readable requirement
    pub description: String,
    /// How binding the constraint is
    pub severity: ConstraintSeverity,
}

impl Constraint {
    pub fn new(
        kind: ConstraintKind,
        description: impl Into<String>,
        severity: ConstraintSeverity,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            severity,
        }
    }
}

/// The unit of work submitted to the orchestrator.
///
/// A task is created by the caller, submitted once, and never mutated by the
/// core. Agents receive it by reference and produce [`AgentResult`]s.
///
/// [`AgentResult`]: crate::agent::result::AgentResult
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// What kind of work is asked for
    pub kind: TaskKind,
    /// Human-readable description of the work
    pub description: String,
    /// Gathered context
    pub context: TaskContext,
    /// Constraints the result must honor, in caller order
    pub constraints: Vec<Constraint>,
    /// Scheduling priority
    pub priority: TaskPriority,
    /// Creation timestamp (milliseconds since epoch)
    pub created_at: u64,
    /// Optional hard deadline (milliseconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,
}

impl Task {
    /// Creates a task with a generated id, default priority, and empty context.
    pub fn new(kind: TaskKind, description: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            kind,
            description: description.into(),
            context: TaskContext::new(),
            constraints: Vec::new(),
            priority: TaskPriority::default(),
            created_at: current_timestamp(),
            deadline: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_context(mut self, context: TaskContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline_ms: u64) -> Self {
        self.deadline = Some(deadline_ms);
        self
    }

    /// Check the task is well-formed before submission.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.description.trim().is_empty() {
            return Err(DomainError::EmptyTaskDescription);
        }
        Ok(())
    }
}
