//! The set of pending add/remove requests awaiting mail confirmation.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::TrackerError;
use crate::models::{PendingConfirmation, PendingKind};

/// Pending confirmations keyed by their single-use token.
#[derive(Debug, Default)]
pub struct Ledger {
    pending: HashMap<String, PendingConfirmation>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(pending: HashMap<String, PendingConfirmation>) -> Self {
        Self { pending }
    }

    /// Store a pending confirmation under its token.
    pub fn put(&mut self, token: impl Into<String>, entry: PendingConfirmation) {
        self.pending.insert(token.into(), entry);
    }

    /// Remove and return the entry for this token.
    ///
    /// The removal happens atomically with the lookup; after a successful
    /// `take` no caller can observe the token as present, which is what
    /// makes every token single-use.
    pub fn take(&mut self, token: &str) -> Result<PendingConfirmation, TrackerError> {
        self.pending
            .remove(token)
            .ok_or(TrackerError::TokenNotFound)
    }

    pub fn has(&self, token: &str) -> bool {
        self.pending.contains_key(token)
    }

    /// True if an add request for this (mail, key) pair is already waiting
    /// for its confirmation.
    pub fn has_pending_add(&self, mail: &str, key: &str) -> bool {
        self.pending.values().any(|entry| {
            entry.mail == mail
                && matches!(&entry.kind, PendingKind::Add { key: pending_key, .. } if pending_key == key)
        })
    }

    /// Drop entries older than `ttl`, returning how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, entry| now - entry.created_at < ttl);
        before - self.pending.len()
    }

    pub fn to_entries(&self) -> HashMap<String, PendingConfirmation> {
        self.pending.clone()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
