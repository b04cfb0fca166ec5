//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These represent programming errors in the caller (the controller must
/// prevent them), not failures of the remote service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("A pending message is already open (id {0})")]
    PendingAlreadyOpen(String),

    #[error("User messages cannot be pending")]
    PendingUserMessage,

    #[error("Invalid thread id: {0}")]
    InvalidThreadId(String),
}

impl DomainError {
    /// Check if this error reports a violation of the single-pending invariant
    pub fn is_pending_violation(&self) -> bool {
        matches!(
            self,
            DomainError::PendingAlreadyOpen(_) | DomainError::PendingUserMessage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_already_open_display() {
        let error = DomainError::PendingAlreadyOpen("a-2".to_string());
        assert_eq!(error.to_string(), "A pending message is already open (id a-2)");
    }

    #[test]
    fn test_is_pending_violation_check() {
        assert!(DomainError::PendingAlreadyOpen("x".to_string()).is_pending_violation());
        assert!(DomainError::PendingUserMessage.is_pending_violation());
        assert!(!DomainError::InvalidThreadId(String::new()).is_pending_violation());
    }
}
