//! Task value objects - identifiers and closed enumerations.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a TaskId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new unique TaskId.
    pub fn generate() -> Self {
        Self(crate::agent::value_objects::uuid_v4())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for TaskId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of work a task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Modify existing code
    Edit,
    /// Produce new code
    Generate,
    /// Restructure without changing behavior
    Refactor,
    /// Write or update documentation
    Document,
    /// Write or run tests
    Test,
    /// Judge an existing proposal or change
    Review,
    /// Improve performance characteristics
    Optimize,
    /// Inspect and explain, no changes
    Analyze,
}

impl TaskKind {
    /// Returns the kind as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            TaskKind::Edit => "edit",
            TaskKind::Generate => "generate",
            TaskKind::Refactor => "refactor",
            TaskKind::Document => "document",
            TaskKind::Test => "test",
            TaskKind::Review => "review",
            TaskKind::Optimize => "optimize",
            TaskKind::Analyze => "analyze",
        }
    }

    /// Kinds that produce code changes. Reviewer agents refuse these.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            TaskKind::Edit
                | TaskKind::Generate
                | TaskKind::Refactor
                | TaskKind::Document
                | TaskKind::Optimize
        )
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "edit" => Ok(TaskKind::Edit),
            "generate" => Ok(TaskKind::Generate),
            "refactor" => Ok(TaskKind::Refactor),
            "document" => Ok(TaskKind::Document),
            "test" => Ok(TaskKind::Test),
            "review" => Ok(TaskKind::Review),
            "optimize" => Ok(TaskKind::Optimize),
            "analyze" => Ok(TaskKind::Analyze),
            other => Err(DomainError::unknown("task kind", other)),
        }
    }
}

/// Scheduling priority of a task.
///
/// Ordered from least to most urgent, so `Critical > Low` holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    /// Returns the priority as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a task constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Style,
    Security,
    Performance,
    Compatibility,
    Resource,
    Testing,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConstraintKind::Style => "style",
            ConstraintKind::Security => "security",
            ConstraintKind::Performance => "performance",
            ConstraintKind::Compatibility => "compatibility",
            ConstraintKind::Resource => "resource",
            ConstraintKind::Testing => "testing",
        };
        write!(f, "{}", s)
    }
}

/// How binding a constraint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ConstraintSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConstraintSeverity::Info => "info",
            ConstraintSeverity::Warning => "warning",
            ConstraintSeverity::Error => "error",
            ConstraintSeverity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}
