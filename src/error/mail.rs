//! Mail delivery errors.

use thiserror::Error;

/// Error returned by the mail capability.
///
/// The tracker propagates these without retrying; retry policy belongs to
/// the mail-transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The relay accepted the connection but refused the message.
    #[error("mail relay returned status {status}: {message}")]
    Relay { status: u16, message: String },

    /// The relay could not be reached at all.
    #[error("failed to reach mail relay: {0}")]
    Transport(String),
}
