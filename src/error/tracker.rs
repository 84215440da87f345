//! Unified error type for the tracker facade.

use thiserror::Error;

use super::{SendError, StoreError};

/// Error returned by the user-facing tracker operations.
///
/// The first three variants are validation errors meant for display next
/// to the offending form field; the remaining variants wrap system faults
/// that occurred while carrying out an otherwise valid request.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A subscription with the same (mail, key) fingerprint already exists
    /// or is awaiting confirmation.
    #[error("a subscription for this mail and key already exists")]
    DuplicateSubscription,

    /// No subscription matched the given mail or key.
    #[error("no matching subscription was found for the given {field}")]
    NotFound { field: &'static str },

    /// The confirmation token is unknown or was already used.
    #[error("this confirmation token is unknown or was already used")]
    TokenNotFound,

    /// The confirmation or notification mail could not be sent.
    #[error("failed to send mail: {0}")]
    Mail(#[from] SendError),

    /// The state snapshot could not be persisted.
    #[error("failed to persist tracker state: {0}")]
    Persistence(#[from] StoreError),
}

impl TrackerError {
    /// The form field this error is attributable to, if any.
    ///
    /// `DuplicateSubscription` points at the key field, `NotFound` at
    /// whichever field failed to match, `TokenNotFound` at the token.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            TrackerError::DuplicateSubscription => Some("key"),
            TrackerError::NotFound { field } => Some(field),
            TrackerError::TokenNotFound => Some("token"),
            TrackerError::Mail(_) | TrackerError::Persistence(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_field_attributable() {
        assert_eq!(TrackerError::DuplicateSubscription.field(), Some("key"));
        assert_eq!(
            TrackerError::NotFound { field: "mail" }.field(),
            Some("mail")
        );
        assert_eq!(TrackerError::TokenNotFound.field(), Some("token"));
    }

    #[test]
    fn test_system_faults_have_no_field() {
        let err = TrackerError::Mail(SendError::Transport("down".to_string()));
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_send_error_converts() {
        let err: TrackerError = SendError::Transport("down".to_string()).into();
        assert!(matches!(err, TrackerError::Mail(_)));
    }
}
