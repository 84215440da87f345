//! Mock balance-query capability.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ApiError;
use crate::traits::BalanceQuery;

/// Scripted [`BalanceQuery`] for tests.
///
/// Outcomes are queued per API key and consumed in order; the last queued
/// outcome is sticky, so a single `push_ok` answers any number of
/// consecutive cycles with the same result. Every call is recorded for
/// verification.
#[derive(Debug, Clone, Default)]
pub struct MockBalanceQuery {
    outcomes: Arc<Mutex<HashMap<String, VecDeque<Result<String, ApiError>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockBalanceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful balance result for this key.
    pub fn push_ok(&self, key: &str, serialized: &str) {
        self.push(key, Ok(serialized.to_string()));
    }

    /// Queue an error outcome for this key.
    pub fn push_err(&self, key: &str, err: ApiError) {
        self.push(key, Err(err));
    }

    /// Replace whatever is scripted for this key with a single sticky
    /// success.
    pub fn set_ok(&self, key: &str, serialized: &str) {
        self.set(key, Ok(serialized.to_string()));
    }

    /// Replace whatever is scripted for this key with a single sticky
    /// error.
    pub fn set_err(&self, key: &str, err: ApiError) {
        self.set(key, Err(err));
    }

    fn push(&self, key: &str, outcome: Result<String, ApiError>) {
        let mut outcomes = self.outcomes.lock().unwrap();
        outcomes.entry(key.to_string()).or_default().push_back(outcome);
    }

    fn set(&self, key: &str, outcome: Result<String, ApiError>) {
        let mut outcomes = self.outcomes.lock().unwrap();
        outcomes.insert(key.to_string(), VecDeque::from([outcome]));
    }

    /// The API keys queried so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times this key was queried.
    pub fn calls_for(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|called| called.as_str() == key)
            .count()
    }
}

#[async_trait]
impl BalanceQuery for MockBalanceQuery {
    async fn query(&self, key: &str, _secret: &str) -> Result<String, ApiError> {
        self.calls.lock().unwrap().push(key.to_string());

        let mut outcomes = self.outcomes.lock().unwrap();
        match outcomes.get_mut(key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ApiError::Other(format!("no outcome scripted for {key}")))),
            None => Err(ApiError::Other(format!("no outcome scripted for {key}"))),
        }
    }
}
