//! The tracker facade.
//!
//! Orchestrates the registry, the confirmation ledger, persistence, and
//! mail into the public operations the web layer calls: `add_request`,
//! `remove_request`, `confirm`, and `start`. All state mutations are
//! funneled through one async mutex; the external mail and balance calls
//! are never made while it is held.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{StoreError, TrackerError};
use crate::fingerprint::{fingerprint, subscription_id};
use crate::ledger::Ledger;
use crate::models::{Confirmed, PendingConfirmation, PendingKind};
use crate::notifier::Notifier;
use crate::registry::Registry;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::traits::{BalanceQuery, Clock, Mailer};

/// The shared mutable state: registry + pending confirmations.
pub(crate) struct TrackerState {
    pub(crate) registry: Registry,
    pub(crate) ledger: Ledger,
}

/// The subscription tracker.
pub struct Tracker {
    pub(crate) state: Mutex<TrackerState>,
    pub(crate) store: SnapshotStore,
    pub(crate) notifier: Notifier,
    pub(crate) balance: Arc<dyn BalanceQuery>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) poll_interval: std::time::Duration,
    pub(crate) pending_ttl: chrono::Duration,
}

impl Tracker {
    pub fn new(
        config: &Config,
        balance: Arc<dyn BalanceQuery>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                registry: Registry::new(),
                ledger: Ledger::new(),
            }),
            store: SnapshotStore::new(config.storage_file.clone()),
            notifier: Notifier::new(mailer, config.public_url.clone(), config.mail.subject.clone()),
            balance,
            clock,
            poll_interval: config.poll_interval(),
            pending_ttl: config.pending_ttl(),
        }
    }

    /// Begin the add flow for a subscription.
    ///
    /// Issues a single-use token, persists it, and mails the confirmation
    /// link. Rejects with `DuplicateSubscription` - without issuing a
    /// token - when the (mail, key) pair is already registered or already
    /// awaiting confirmation.
    pub async fn add_request(
        &self,
        mail: &str,
        key: &str,
        secret: &str,
    ) -> Result<(), TrackerError> {
        let token = {
            let mut state = self.state.lock().await;
            let id = subscription_id(mail, key);
            if state.registry.contains(&id) || state.ledger.has_pending_add(mail, key) {
                return Err(TrackerError::DuplicateSubscription);
            }
            let now = self.clock.now();
            let token = fingerprint(&[mail, key, secret, &now.timestamp_micros().to_string()]);
            state
                .ledger
                .put(token.clone(), PendingConfirmation::add(mail, key, secret, now));
            self.persist(&state)?;
            token
        };

        tracing::info!(mail = %mail, "subscription requested, awaiting confirmation");
        self.notifier.send_add_confirmation(mail, &token).await?;
        Ok(())
    }

    /// Begin the removal flow for one subscription (`key` given) or for
    /// every subscription of a mail address (`key` absent).
    pub async fn remove_request(
        &self,
        mail: &str,
        key: Option<&str>,
    ) -> Result<(), TrackerError> {
        let token = {
            let mut state = self.state.lock().await;
            match key {
                Some(key) => {
                    if !state.registry.contains(&subscription_id(mail, key)) {
                        return Err(TrackerError::NotFound { field: "key" });
                    }
                }
                None => {
                    if !state.registry.has_mail(mail) {
                        return Err(TrackerError::NotFound { field: "mail" });
                    }
                }
            }
            let now = self.clock.now();
            let token = fingerprint(&[mail, key.unwrap_or(""), &now.timestamp_micros().to_string()]);
            state.ledger.put(
                token.clone(),
                PendingConfirmation::remove(mail, key.map(str::to_string), now),
            );
            self.persist(&state)?;
            token
        };

        tracing::info!(mail = %mail, "removal requested, awaiting confirmation");
        self.notifier.send_remove_confirmation(mail, key, &token).await?;
        Ok(())
    }

    /// Consume a confirmation token and apply the pending action.
    ///
    /// The ledger entry is removed - and the removal persisted - before
    /// the registry mutation runs, so a token can never be used twice no
    /// matter how the action itself ends.
    pub async fn confirm(&self, token: &str) -> Result<Confirmed, TrackerError> {
        let mut state = self.state.lock().await;
        let PendingConfirmation { mail, kind, .. } = state.ledger.take(token)?;
        self.persist(&state)?;

        let outcome = match kind {
            PendingKind::Add { key, secret } => {
                state.registry.add(mail.clone(), key, secret).map(|_| {
                    tracing::info!(mail = %mail, "subscription confirmed");
                    Confirmed::Added
                })
            }
            PendingKind::Remove { key: Some(key) } => state
                .registry
                .remove_by_mail_and_key(&mail, &key)
                .map(|_| {
                    tracing::info!(mail = %mail, "subscription removed");
                    Confirmed::Removed { count: 1 }
                }),
            PendingKind::Remove { key: None } => {
                state.registry.remove_all_by_mail(&mail).map(|count| {
                    tracing::info!(mail = %mail, count, "all subscriptions removed");
                    Confirmed::Removed { count }
                })
            }
        };

        if outcome.is_ok() {
            self.persist(&state)?;
        }
        outcome
    }

    /// Load the snapshot (creating an empty one if absent) into memory.
    pub async fn load(&self) -> Result<(), TrackerError> {
        let snapshot = self.store.load_or_init()?;
        let mut state = self.state.lock().await;
        state.registry = Registry::from_entries(snapshot.registry);
        state.ledger = Ledger::from_entries(snapshot.pending);

        let purged = state
            .ledger
            .purge_expired(self.clock.now(), self.pending_ttl);
        if purged > 0 {
            tracing::debug!(purged, "dropped expired pending confirmations at startup");
            self.persist(&state)?;
        }

        tracing::info!(
            subscriptions = state.registry.len(),
            pending = state.ledger.len(),
            "tracker state loaded"
        );
        Ok(())
    }

    /// Load the snapshot and begin the poll loop.
    pub async fn start(self: Arc<Self>) -> Result<(), TrackerError> {
        self.load().await?;
        let tracker = Arc::clone(&self);
        tokio::spawn(async move {
            tracker.poll_loop().await;
        });
        Ok(())
    }

    /// Number of active subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    /// Number of requests awaiting confirmation.
    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.ledger.len()
    }

    /// Rewrite the snapshot file from the in-memory state.
    pub(crate) fn persist(&self, state: &TrackerState) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            registry: state.registry.to_entries(),
            pending: state.ledger.to_entries(),
        };
        self.store.save(&snapshot)
    }
}
