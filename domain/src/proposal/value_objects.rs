//! Proposal value objects.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Unique identifier for a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(String);

impl ProposalId {
    /// Creates a ProposalId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new unique ProposalId.
    pub fn generate() -> Self {
        Self(crate::agent::value_objects::uuid_v4())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ProposalId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What shape of change a proposal describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    FileChange,
    FileCreation,
    FileDeletion,
    Refactoring,
    Architecture,
}

impl std::str::FromStr for ProposalKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file_change" => Ok(ProposalKind::FileChange),
            "file_creation" => Ok(ProposalKind::FileCreation),
            "file_deletion" => Ok(ProposalKind::FileDeletion),
            "refactoring" => Ok(ProposalKind::Refactoring),
            "architecture" => Ok(ProposalKind::Architecture),
            other => Err(DomainError::unknown("proposal kind", other)),
        }
    }
}

/// Operation performed by a single [`Change`](super::entities::Change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
    Move,
    Rename,
}

impl std::str::FromStr for ChangeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(ChangeKind::Create),
            "update" => Ok(ChangeKind::Update),
            "delete" => Ok(ChangeKind::Delete),
            "move" => Ok(ChangeKind::Move),
            "rename" => Ok(ChangeKind::Rename),
            other => Err(DomainError::unknown("change kind", other)),
        }
    }
}

/// Blast radius of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImpactScope {
    #[default]
    Local,
    Module,
    Project,
    Ecosystem,
}

/// How risky applying a proposal is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}
