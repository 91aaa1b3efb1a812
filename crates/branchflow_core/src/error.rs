//! Core error types for BRANCHFLOW.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid ID format
    InvalidId {
        /// Why the id was rejected
        reason: String,
    },

    /// Already exists
    AlreadyExists {
        /// Kind of entity
        kind: String,
        /// Identifier that collided
        id: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { reason } => write!(f, "Invalid ID: {}", reason),
            Self::AlreadyExists { kind, id } => write!(f, "{} already exists: {}", kind, id),
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidId {
            reason: "empty".to_string(),
        };
        assert_eq!(format!("{}", err), "Invalid ID: empty");

        let err = CoreError::AlreadyExists {
            kind: "Step".to_string(),
            id: "42".to_string(),
        };
        assert_eq!(format!("{}", err), "Step already exists: 42");
    }

    #[test]
    fn test_error_equality() {
        let a = CoreError::InvalidId {
            reason: "x".to_string(),
        };
        assert_eq!(a.clone(), a);
        assert_ne!(
            a,
            CoreError::AlreadyExists {
                kind: "Step".to_string(),
                id: "x".to_string()
            }
        );
    }
}
