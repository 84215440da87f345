//! Kraken balance-query adapter.
//!
//! Implements [`BalanceQuery`] against Kraken's private REST API. The
//! adapter owns the request signature scheme and the translation of the
//! API's error vocabulary into [`ApiError`] tags; nothing outside this
//! module ever sees a raw Kraken error string.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256, Sha512};

use crate::error::ApiError;
use crate::traits::BalanceQuery;

type HmacSha512 = Hmac<Sha512>;

/// Default base URL of the Kraken REST API.
pub const KRAKEN_BASE_URL: &str = "https://api.kraken.com";

/// URL path of the private balance endpoint.
const BALANCE_PATH: &str = "/0/private/Balance";

/// Wire shape of every Kraken private-API response.
#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(default)]
    error: Vec<String>,
    result: Option<serde_json::Value>,
}

/// [`BalanceQuery`] implementation backed by the Kraken REST API.
#[derive(Debug, Clone)]
pub struct KrakenBalanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl KrakenBalanceClient {
    /// Create a client against the public Kraken endpoint.
    pub fn new() -> Self {
        Self::with_base_url(KRAKEN_BASE_URL.to_string())
    }

    /// Create a client against a custom base URL (used in tests).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

impl Default for KrakenBalanceClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the `API-Sign` header value.
///
/// HMAC-SHA512 of (path + SHA-256(nonce + body)) keyed with the
/// base64-decoded secret, base64-encoded.
fn sign(path: &str, nonce: u64, body: &str, secret: &str) -> Result<String, ApiError> {
    let decoded = STANDARD
        .decode(secret)
        .map_err(|_| ApiError::InvalidKey("API secret is not valid base64".to_string()))?;

    let mut sha = Sha256::new();
    sha.update(nonce.to_string().as_bytes());
    sha.update(body.as_bytes());
    let digest = sha.finalize();

    let mut mac = HmacSha512::new_from_slice(&decoded)
        .map_err(|err| ApiError::Other(format!("failed to build request signature: {err}")))?;
    mac.update(path.as_bytes());
    mac.update(&digest);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Map a Kraken error code to its [`ApiError`] tag.
///
/// Nonce errors usually fix themselves on the next request, so they are
/// transient; unknown codes stay unclassified rather than guessing.
pub fn classify_api_error(code: &str) -> ApiError {
    if code.contains("Invalid nonce") {
        ApiError::Transient(code.to_string())
    } else if code.contains("Invalid key") {
        ApiError::InvalidKey(code.to_string())
    } else if code.contains("Permission denied") {
        ApiError::PermissionDenied(code.to_string())
    } else {
        ApiError::Other(code.to_string())
    }
}

#[async_trait]
impl BalanceQuery for KrakenBalanceClient {
    async fn query(&self, key: &str, secret: &str) -> Result<String, ApiError> {
        let nonce = Utc::now().timestamp_millis() as u64;
        let body = format!("nonce={nonce}");
        let signature = sign(BALANCE_PATH, nonce, &body, secret)?;

        let url = format!("{}{}", self.base_url, BALANCE_PATH);
        let response = self
            .client
            .post(&url)
            .header("API-Key", key)
            .header("API-Sign", signature)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(|err| ApiError::Other(format!("balance request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Other(format!(
                "balance API returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let payload: BalanceResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Other(format!("invalid balance response: {err}")))?;

        if let Some(code) = payload.error.first() {
            return Err(classify_api_error(code));
        }

        match payload.result {
            Some(result) => serde_json::to_string(&result)
                .map_err(|err| ApiError::Other(format!("unserializable balance result: {err}"))),
            None => Err(ApiError::Other(
                "response contained neither result nor error".to_string(),
            )),
        }
    }
}
