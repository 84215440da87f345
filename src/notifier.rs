//! Message construction and mail dispatch.
//!
//! Thin wrapper over the [`Mailer`] capability carrying the copy for every
//! mail the tracker sends. Send failures are propagated, never retried.
//! Secrets never appear in any message; keys are surfaced as a short
//! prefix only.

use std::sync::Arc;

use crate::error::SendError;
use crate::traits::Mailer;

/// How many characters of an API key outward messages may show.
const KEY_PREFIX_LEN: usize = 8;

/// Truncate an API key to a displayable prefix.
pub fn key_prefix(key: &str) -> String {
    if key.chars().count() <= KEY_PREFIX_LEN {
        key.to_string()
    } else {
        let prefix: String = key.chars().take(KEY_PREFIX_LEN).collect();
        format!("{prefix}…")
    }
}

/// Builds and sends every mail the tracker produces.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    public_url: String,
    subject: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, public_url: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            mailer,
            public_url: public_url.into(),
            subject: subject.into(),
        }
    }

    /// The confirmation link for a token, with the token as a query
    /// parameter.
    pub fn confirm_link(&self, token: &str) -> String {
        format!(
            "{}/confirm?token={}",
            self.public_url,
            urlencoding::encode(token)
        )
    }

    /// Mail the double-opt-in link for a new subscription.
    pub async fn send_add_confirmation(&self, mail: &str, token: &str) -> Result<(), SendError> {
        let body = format!(
            "Please confirm your Saldo subscription by visiting this location: {}\n\
             If you did not enter your mail address at Saldo please ignore this email.",
            self.confirm_link(token)
        );
        self.mailer.send(mail, &self.subject, &body).await
    }

    /// Mail the double-opt-in link for a removal.
    ///
    /// The copy names the key when one was given and announces removal of
    /// all subscriptions otherwise.
    pub async fn send_remove_confirmation(
        &self,
        mail: &str,
        key: Option<&str>,
        token: &str,
    ) -> Result<(), SendError> {
        let link = self.confirm_link(token);
        let body = match key {
            Some(key) => format!(
                "Please confirm the deletion of the Saldo notification for the key {} by visiting this location: {}\n\
                 If you did not request a deletion at Saldo please ignore this email.",
                key_prefix(key),
                link
            ),
            None => format!(
                "Please confirm the deletion of all Saldo subscriptions by visiting this location: {}\n\
                 If you did not request a deletion at Saldo please ignore this email.",
                link
            ),
        };
        self.mailer.send(mail, &self.subject, &body).await
    }

    /// Mail the newly observed balance.
    pub async fn send_balance_update(&self, mail: &str, serialized: &str) -> Result<(), SendError> {
        let body = format!("Your balance has changed:\n{serialized}");
        self.mailer.send(mail, &self.subject, &body).await
    }

    /// Tell the subscriber their key was rejected and the subscription is
    /// gone.
    pub async fn send_invalid_key(&self, mail: &str, key: &str) -> Result<(), SendError> {
        let body = format!(
            "Your API key {} is not valid. The subscription has been removed. \
             Please create another subscription with a valid key if you want to receive further notifications.",
            key_prefix(key)
        );
        self.mailer.send(mail, &self.subject, &body).await
    }

    /// Tell the subscriber their key lacks the balance-read permission.
    pub async fn send_permission_denied(&self, mail: &str, key: &str) -> Result<(), SendError> {
        let body = format!(
            "Your API key {} is missing the permission to query balances. The subscription has been removed. \
             Please grant the read permission and create a new subscription.",
            key_prefix(key)
        );
        self.mailer.send(mail, &self.subject, &body).await
    }
}
