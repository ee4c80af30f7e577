//! Agent value objects - identity, roles, capabilities.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Unique identifier for an agent.
///
/// Agent ids are unique within an orchestrator; registering the same id
/// twice is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new unique AgentId.
    pub fn generate() -> Self {
        Self(uuid_v4())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What position an agent takes in the orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Produces candidate proposals for a task
    Lead,
    /// Judges proposals produced by a lead
    Reviewer,
    /// Specialized reviewer consulted on demand (mandatory-reviewer list)
    Expert,
}

impl AgentRole {
    /// Returns the role as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            AgentRole::Lead => "lead",
            AgentRole::Reviewer => "reviewer",
            AgentRole::Expert => "expert",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lead" => Ok(AgentRole::Lead),
            "reviewer" => Ok(AgentRole::Reviewer),
            "expert" => Ok(AgentRole::Expert),
            other => Err(DomainError::unknown("agent role", other)),
        }
    }
}

/// A skill an agent advertises. Used for reviewer selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CodeGeneration,
    CodeReview,
    Testing,
    Documentation,
    Refactoring,
    SecurityAnalysis,
    PerformanceAnalysis,
    ArchitectureReview,
}

impl Capability {
    /// Returns the capability as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Capability::CodeGeneration => "code_generation",
            Capability::CodeReview => "code_review",
            Capability::Testing => "testing",
            Capability::Documentation => "documentation",
            Capability::Refactoring => "refactoring",
            Capability::SecurityAnalysis => "security_analysis",
            Capability::PerformanceAnalysis => "performance_analysis",
            Capability::ArchitectureReview => "architecture_review",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "code_generation" => Ok(Capability::CodeGeneration),
            "code_review" => Ok(Capability::CodeReview),
            "testing" => Ok(Capability::Testing),
            "documentation" => Ok(Capability::Documentation),
            "refactoring" => Ok(Capability::Refactoring),
            "security_analysis" => Ok(Capability::SecurityAnalysis),
            "performance_analysis" => Ok(Capability::PerformanceAnalysis),
            "architecture_review" => Ok(Capability::ArchitectureReview),
            other => Err(DomainError::unknown("capability", other)),
        }
    }
}

/// Focus area of a reviewer or expert.
///
/// A specialization is a field on the agent, not a subtype: it changes which
/// capability the agent is granted and which review prompt it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    Security,
    Performance,
    Architecture,
    Testing,
    #[default]
    General,
}

impl Specialization {
    /// Returns the specialization as a lowercase string identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Specialization::Security => "security",
            Specialization::Performance => "performance",
            Specialization::Architecture => "architecture",
            Specialization::Testing => "testing",
            Specialization::General => "general",
        }
    }

    /// The capability this specialization grants on top of the profile's.
    pub fn granted_capability(&self) -> Option<Capability> {
        match self {
            Specialization::Security => Some(Capability::SecurityAnalysis),
            Specialization::Performance => Some(Capability::PerformanceAnalysis),
            Specialization::Architecture => Some(Capability::ArchitectureReview),
            Specialization::Testing => Some(Capability::Testing),
            Specialization::General => None,
        }
    }
}

impl std::fmt::Display for Specialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Specialization {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "security" => Ok(Specialization::Security),
            "performance" => Ok(Specialization::Performance),
            "architecture" => Ok(Specialization::Architecture),
            "testing" => Ok(Specialization::Testing),
            "general" => Ok(Specialization::General),
            other => Err(DomainError::unknown("specialization", other)),
        }
    }
}

/// Generate a v4-shaped UUID without an external dependency.
///
/// Seeds a 64-bit finalizer with the clock and a process-local counter, so
/// ids stay distinct within a process even when the clock does not advance
/// between calls.
pub(crate) fn uuid_v4() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    let seed = nanos ^ SEQUENCE
        .fetch_add(1, Ordering::Relaxed)
        .rotate_left(32);

    // version nibble 4 in the high half, RFC 4122 variant bits in the low
    let hi = (scramble(seed) & 0xffff_ffff_ffff_0fff) | 0x4000;
    let lo = (scramble(seed ^ 0x6a09_e667_f3bc_c909) >> 2) | 0x8000_0000_0000_0000;

    let hex = format!("{hi:016x}{lo:016x}");
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}

/// SplitMix64 finalizer; enough bit diffusion for id generation.
fn scramble(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
