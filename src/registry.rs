//! The authoritative set of active subscriptions.
//!
//! Entries live in an ordered `Vec` (the poll order) with a fingerprint
//! index on top. Every mutation keeps the two in sync; `consistent()`
//! verifies the invariant and is asserted after each mutation in debug
//! builds.

use std::collections::HashMap;

use crate::error::TrackerError;
use crate::fingerprint::subscription_id;
use crate::models::{LastResult, Subscription};

/// Registry of active subscriptions, keyed by (mail, key) fingerprint.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Subscription>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted entries.
    ///
    /// Later duplicates of the same fingerprint are dropped; the snapshot
    /// is written by this process only, so this cannot happen in practice.
    pub fn from_entries(entries: Vec<Subscription>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            let id = entry.id();
            if registry.index.contains_key(&id) {
                tracing::warn!(id = %id, "dropping duplicate registry entry from snapshot");
                continue;
            }
            registry.index.insert(id, registry.entries.len());
            registry.entries.push(entry);
        }
        debug_assert!(registry.consistent());
        registry
    }

    /// Register a new subscription.
    pub fn add(
        &mut self,
        mail: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<(), TrackerError> {
        let entry = Subscription::new(mail, key, secret);
        let id = entry.id();
        if self.index.contains_key(&id) {
            return Err(TrackerError::DuplicateSubscription);
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(entry);
        debug_assert!(self.consistent());
        Ok(())
    }

    /// Remove the subscription for exactly this (mail, key) pair.
    pub fn remove_by_mail_and_key(&mut self, mail: &str, key: &str) -> Result<(), TrackerError> {
        let id = subscription_id(mail, key);
        let pos = self
            .index
            .remove(&id)
            .ok_or(TrackerError::NotFound { field: "key" })?;
        self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        debug_assert!(self.consistent());
        Ok(())
    }

    /// Remove every subscription whose mail matches, returning the count.
    ///
    /// Matches are removed back-to-front so earlier positions stay valid
    /// while iterating; the index is rebuilt afterwards.
    pub fn remove_all_by_mail(&mut self, mail: &str) -> Result<usize, TrackerError> {
        let mut removed = 0;
        let mut i = self.entries.len();
        while i > 0 {
            i -= 1;
            if self.entries[i].mail == mail {
                self.entries.remove(i);
                removed += 1;
            }
        }
        if removed == 0 {
            return Err(TrackerError::NotFound { field: "mail" });
        }
        self.rebuild_index();
        debug_assert!(self.consistent());
        Ok(removed)
    }

    /// Record the latest observed poll outcome for a subscription.
    ///
    /// Returns `false` when the id is no longer registered (it may have
    /// been removed while the poll was in flight).
    pub fn update_last_result(&mut self, id: &str, value: LastResult) -> bool {
        match self.index.get(id) {
            Some(&pos) => {
                self.entries[pos].last_result = value;
                true
            }
            None => false,
        }
    }

    /// Look up a subscription by fingerprint.
    pub fn get(&self, id: &str) -> Option<&Subscription> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// True if any subscription belongs to this mail address.
    pub fn has_mail(&self, mail: &str) -> bool {
        self.entries.iter().any(|entry| entry.mail == mail)
    }

    /// All active subscriptions in poll order.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.entries
    }

    /// Clone the entries for persistence.
    pub fn to_entries(&self) -> Vec<Subscription> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.id(), pos))
            .collect();
    }

    /// Every indexed id resolves to a live position and vice versa.
    pub fn consistent(&self) -> bool {
        if self.index.len() != self.entries.len() {
            return false;
        }
        self.entries.iter().enumerate().all(|(pos, entry)| {
            self.index.get(&entry.id()) == Some(&pos)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(pairs: &[(&str, &str)]) -> Registry {
        let mut registry = Registry::new();
        for (mail, key) in pairs {
            registry.add(*mail, *key, "secret").unwrap();
        }
        registry
    }

    #[test]
    fn test_add_and_lookup() {
        let registry = registry_with(&[("a@x.com", "K1")]);
        let id = subscription_id("a@x.com", "K1");
        assert!(registry.contains(&id));
        assert_eq!(registry.get(&id).unwrap().mail, "a@x.com");
        assert!(registry.consistent());
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut registry = registry_with(&[("a@x.com", "K1")]);
        let err = registry.add("a@x.com", "K1", "other").unwrap_err();
        assert!(matches!(err, TrackerError::DuplicateSubscription));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_by_mail_and_key() {
        let mut registry = registry_with(&[("a@x.com", "K1"), ("a@x.com", "K2")]);
        registry.remove_by_mail_and_key("a@x.com", "K1").unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&subscription_id("a@x.com", "K2")));
        assert!(registry.consistent());
    }

    #[test]
    fn test_remove_missing_key_fails_with_key_field() {
        let mut registry = registry_with(&[("a@x.com", "K1")]);
        let err = registry
            .remove_by_mail_and_key("a@x.com", "Knonexistent")
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { field: "key" }));
    }

    #[test]
    fn test_remove_middle_entry_keeps_index_in_sync() {
        let mut registry =
            registry_with(&[("a@x.com", "K1"), ("b@y.com", "K2"), ("c@z.com", "K3")]);
        registry.remove_by_mail_and_key("b@y.com", "K2").unwrap();
        assert!(registry.consistent());
        assert_eq!(
            registry.get(&subscription_id("c@z.com", "K3")).unwrap().key,
            "K3"
        );
    }

    #[test]
    fn test_remove_all_by_mail() {
        let mut registry = registry_with(&[
            ("a@x.com", "K1"),
            ("b@y.com", "K2"),
            ("a@x.com", "K3"),
            ("a@x.com", "K4"),
        ]);
        let removed = registry.remove_all_by_mail("a@x.com").unwrap();
        assert_eq!(removed, 3);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&subscription_id("b@y.com", "K2")));
        assert!(registry.consistent());
    }

    #[test]
    fn test_remove_all_by_mail_without_match_fails_with_mail_field() {
        let mut registry = registry_with(&[("a@x.com", "K1")]);
        let err = registry.remove_all_by_mail("b@y.com").unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { field: "mail" }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_update_last_result() {
        let mut registry = registry_with(&[("a@x.com", "K1")]);
        let id = subscription_id("a@x.com", "K1");
        assert!(registry.update_last_result(&id, LastResult::Balance("{}".to_string())));
        assert_eq!(
            registry.get(&id).unwrap().last_result,
            LastResult::Balance("{}".to_string())
        );
    }

    #[test]
    fn test_update_last_result_for_removed_id_returns_false() {
        let mut registry = registry_with(&[("a@x.com", "K1")]);
        let id = subscription_id("a@x.com", "K1");
        registry.remove_by_mail_and_key("a@x.com", "K1").unwrap();
        assert!(!registry.update_last_result(&id, LastResult::Errored));
    }

    #[test]
    fn test_from_entries_rebuilds_index() {
        let seeded = registry_with(&[("a@x.com", "K1"), ("b@y.com", "K2")]);
        let rebuilt = Registry::from_entries(seeded.to_entries());
        assert!(rebuilt.consistent());
        assert_eq!(rebuilt.len(), 2);
        assert!(rebuilt.contains(&subscription_id("a@x.com", "K1")));
    }

    #[test]
    fn test_from_entries_drops_duplicate_fingerprints() {
        let entries = vec![
            Subscription::new("a@x.com", "K1", "S1"),
            Subscription::new("a@x.com", "K1", "S2"),
        ];
        let registry = Registry::from_entries(entries);
        assert_eq!(registry.len(), 1);
        assert!(registry.consistent());
    }
}
