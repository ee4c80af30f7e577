//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Task description must not be empty")]
    EmptyTaskDescription,

    #[error("Unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },

    #[error("Value {value} for {field} outside [0, 1]")]
    OutOfRange { field: &'static str, value: f64 },
}

impl DomainError {
    /// Build an unknown-variant error for a `FromStr` failure.
    pub fn unknown(field: &'static str, value: impl Into<String>) -> Self {
        DomainError::UnknownVariant {
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_display() {
        let err = DomainError::unknown("task kind", "compile");
        assert_eq!(err.to_string(), "Unknown task kind: compile");
    }

    #[test]
    fn test_empty_description_display() {
        assert_eq!(
            DomainError::EmptyTaskDescription.to_string(),
            "Task description must not be empty"
        );
    }
}
