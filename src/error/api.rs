//! Classified outcomes of the external balance query.

use thiserror::Error;

/// Error returned by the balance-query capability.
///
/// The adapter layer translates the remote API's error vocabulary into
/// these variants; the poller never inspects raw error strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Short-lived error class that self-corrects on the next cycle
    /// (nonce/timing errors).
    #[error("transient API error: {0}")]
    Transient(String),

    /// The API key was rejected as invalid.
    #[error("API key rejected: {0}")]
    InvalidKey(String),

    /// The key is valid but lacks the permission to query balances.
    #[error("API key lacks the required permission: {0}")]
    PermissionDenied(String),

    /// Anything else: remote outages, transport failures, malformed
    /// responses, timeouts.
    #[error("balance API error: {0}")]
    Other(String),
}

impl ApiError {
    /// True for errors that are expected to clear without any action.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }

    /// True for credential-level errors that invalidate the subscription.
    pub fn invalidates_credentials(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidKey(_) | ApiError::PermissionDenied(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let err = ApiError::Transient("EAPI:Invalid nonce".to_string());
        assert!(err.is_transient());
        assert!(!err.invalidates_credentials());
    }

    #[test]
    fn test_credential_errors_invalidate() {
        assert!(ApiError::InvalidKey("bad".to_string()).invalidates_credentials());
        assert!(ApiError::PermissionDenied("denied".to_string()).invalidates_credentials());
        assert!(!ApiError::Other("outage".to_string()).invalidates_credentials());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ApiError::Other("EService:Unavailable".to_string());
        assert!(err.to_string().contains("EService:Unavailable"));
    }
}
