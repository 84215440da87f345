//! HTTP mail-relay adapter.
//!
//! Implements [`Mailer`] by posting messages to a REST mail relay
//! (Mailgun-style). Delivery retries, if any, are the relay's business.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SendError;
use crate::traits::Mailer;

/// Wire shape of a send request.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// [`Mailer`] implementation backed by an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct MailApiClient {
    endpoint: String,
    api_token: String,
    from: String,
    client: reqwest::Client,
}

impl MailApiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: api_token.into(),
            from: from.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for MailApiClient {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), SendError> {
        let request = SendRequest {
            from: &self.from,
            to,
            subject,
            text: body,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|err| SendError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SendError::Relay { status, message });
        }

        Ok(())
    }
}
