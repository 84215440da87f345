//! Data model for subscriptions and pending confirmations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::subscription_id;

/// Last observed poll outcome for a subscription.
///
/// `Never` and `Errored` are distinct so that the first observation after
/// an outage notifies even when the balance itself did not change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LastResult {
    /// No poll has completed for this subscription yet.
    #[default]
    Never,
    /// The last poll ended in an error.
    Errored,
    /// The last poll returned this serialized balance.
    Balance(String),
}

/// An active (mail, key, secret) triple being polled for balance changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub mail: String,
    pub key: String,
    pub secret: String,
    #[serde(default)]
    pub last_result: LastResult,
}

impl Subscription {
    pub fn new(
        mail: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            mail: mail.into(),
            key: key.into(),
            secret: secret.into(),
            last_result: LastResult::Never,
        }
    }

    /// Fingerprint of (mail, key); the registry identity of this entry.
    pub fn id(&self) -> String {
        subscription_id(&self.mail, &self.key)
    }
}

/// The action a pending confirmation will perform once confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingKind {
    /// Register a new subscription with these credentials.
    Add { key: String, secret: String },
    /// Remove one subscription (`key` set) or every subscription of the
    /// requesting mail address (`key` absent).
    Remove {
        #[serde(default)]
        key: Option<String>,
    },
}

/// A requested add/remove action awaiting its mailed confirmation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub mail: String,
    #[serde(flatten)]
    pub kind: PendingKind,
    pub created_at: DateTime<Utc>,
}

impl PendingConfirmation {
    pub fn add(
        mail: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            mail: mail.into(),
            kind: PendingKind::Add {
                key: key.into(),
                secret: secret.into(),
            },
            created_at,
        }
    }

    pub fn remove(
        mail: impl Into<String>,
        key: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            mail: mail.into(),
            kind: PendingKind::Remove { key },
            created_at,
        }
    }
}

/// Outcome of a successfully confirmed action, for kind-specific copy in
/// the caller's UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmed {
    /// A subscription was registered.
    Added,
    /// This many subscriptions were removed.
    Removed { count: usize },
}
