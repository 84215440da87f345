//! Mock mail-transport capability.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::SendError;
use crate::traits::Mailer;

/// A mail recorded by [`MockMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Recording [`Mailer`] for tests, with failure injection.
///
/// While a failure is set every send fails without being recorded;
/// clearing it restores normal delivery.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    failure: Arc<Mutex<Option<SendError>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All successfully delivered mails, in send order.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// The most recent delivered mail, if any.
    pub fn last(&self) -> Option<SentMail> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    /// Make subsequent sends fail with this error (`None` restores
    /// delivery).
    pub fn set_failure(&self, failure: Option<SendError>) {
        *self.failure.lock().unwrap() = failure;
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError> {
        if let Some(failure) = self.failure.lock().unwrap().clone() {
            return Err(failure);
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
