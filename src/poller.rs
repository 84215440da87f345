//! The periodic account-polling loop.
//!
//! One cycle walks every active subscription in registry order, querying
//! the balance API strictly sequentially - one call in flight at a time -
//! to bound the outbound request rate and keep failure handling simple.
//! The state lock is never held across an external call.

use crate::error::ApiError;
use crate::models::LastResult;
use crate::tracker::Tracker;
use crate::traits::{BalanceQuery, Clock};

/// Counters for one completed poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Subscriptions queried this cycle.
    pub polled: usize,
    /// Balance-change notifications triggered.
    pub notified: usize,
    /// Subscriptions evicted for credential errors.
    pub evicted: usize,
    /// Unclassified API failures.
    pub failed: usize,
}

impl Tracker {
    /// Run one full poll cycle and persist the snapshot afterwards.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let targets = {
            let state = self.state.lock().await;
            state.registry.to_entries()
        };

        let mut outcome = CycleOutcome::default();
        for sub in targets {
            outcome.polled += 1;
            let id = sub.id();

            match self.balance.query(&sub.key, &sub.secret).await {
                Ok(serialized) => {
                    let new = LastResult::Balance(serialized.clone());
                    let changed = {
                        let mut state = self.state.lock().await;
                        let changed = match state.registry.get(&id) {
                            // The subscription may have been removed while
                            // the query was in flight.
                            None => false,
                            Some(current) => current.last_result != new,
                        };
                        if changed {
                            state.registry.update_last_result(&id, new);
                        }
                        changed
                    };
                    if changed {
                        outcome.notified += 1;
                        if let Err(err) =
                            self.notifier.send_balance_update(&sub.mail, &serialized).await
                        {
                            tracing::warn!(mail = %sub.mail, %err, "balance notification failed");
                        }
                    }
                }
                Err(ApiError::Transient(detail)) => {
                    tracing::debug!(mail = %sub.mail, detail = %detail, "transient API error, will retry next cycle");
                }
                Err(ApiError::InvalidKey(detail)) => {
                    outcome.evicted += 1;
                    tracing::warn!(mail = %sub.mail, detail = %detail, "invalid key, evicting subscription");
                    if let Err(err) = self.notifier.send_invalid_key(&sub.mail, &sub.key).await {
                        tracing::warn!(mail = %sub.mail, %err, "invalid-key notification failed");
                    }
                    self.evict(&sub.mail, &sub.key).await;
                }
                Err(ApiError::PermissionDenied(detail)) => {
                    outcome.evicted += 1;
                    tracing::warn!(mail = %sub.mail, detail = %detail, "permission denied, evicting subscription");
                    if let Err(err) =
                        self.notifier.send_permission_denied(&sub.mail, &sub.key).await
                    {
                        tracing::warn!(mail = %sub.mail, %err, "permission-denied notification failed");
                    }
                    self.evict(&sub.mail, &sub.key).await;
                }
                Err(ApiError::Other(detail)) => {
                    outcome.failed += 1;
                    tracing::warn!(mail = %sub.mail, detail = %detail, "balance API unavailable");
                    let mut state = self.state.lock().await;
                    state.registry.update_last_result(&id, LastResult::Errored);
                }
            }
        }

        {
            let mut state = self.state.lock().await;
            let purged = state
                .ledger
                .purge_expired(self.clock.now(), self.pending_ttl);
            if purged > 0 {
                tracing::debug!(purged, "dropped expired pending confirmations");
            }
            if let Err(err) = self.persist(&state) {
                // The in-memory state stays authoritative; the next
                // successful save reconverges the snapshot.
                tracing::error!(%err, "failed to persist snapshot after poll cycle");
            }
        }

        outcome
    }

    /// Run poll cycles forever, waiting `poll_interval` between the end of
    /// one cycle and the start of the next so cycles never overlap.
    pub(crate) async fn poll_loop(&self) {
        loop {
            tracing::debug!("starting poll cycle");
            let outcome = self.run_cycle().await;
            tracing::info!(
                polled = outcome.polled,
                notified = outcome.notified,
                evicted = outcome.evicted,
                failed = outcome.failed,
                "poll cycle complete"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Remove a subscription evicted by the poller; it may already be gone
    /// if the user confirmed a removal while the query was in flight.
    async fn evict(&self, mail: &str, key: &str) {
        let mut state = self.state.lock().await;
        if state.registry.remove_by_mail_and_key(mail, key).is_err() {
            tracing::debug!(mail = %mail, "subscription already removed before eviction");
        }
    }
}
