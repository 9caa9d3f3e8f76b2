//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Duplicate worker in candidate set: {0}")]
    DuplicateWorker(String),

    #[error("Invalid worker id: {0}")]
    InvalidWorker(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Check if this error comes from a broken candidate set
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DomainError::DuplicateWorker(_) | DomainError::InvalidWorker(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_display() {
        let error = DomainError::InvalidTransition {
            from: "done".to_string(),
            to: "synthesizing".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid stage transition: done -> synthesizing"
        );
    }

    #[test]
    fn test_is_config_error() {
        assert!(DomainError::DuplicateWorker("a".to_string()).is_config_error());
        assert!(DomainError::InvalidWorker(String::new()).is_config_error());
        assert!(!DomainError::InvalidQuestion("q".to_string()).is_config_error());
    }
}
