//! Mail-transport capability.

use async_trait::async_trait;

use crate::error::SendError;

/// Delivers a single mail message.
///
/// The core constructs message bodies and propagates failures without
/// retrying; delivery mechanics (SMTP, relay APIs, queueing) live behind
/// this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError>;
}
