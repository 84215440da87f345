//! Balance-query capability.

use async_trait::async_trait;

use crate::error::ApiError;

/// Queries the external account API for the current balance.
///
/// Implementations own transport, timeout, and error-classification
/// policy; the core only dispatches on the returned [`ApiError`] tag.
///
/// # Example
///
/// ```ignore
/// use saldo::traits::BalanceQuery;
///
/// async fn poll_one<B: BalanceQuery>(api: &B) {
///     match api.query("key", "secret").await {
///         Ok(serialized) => println!("balance: {serialized}"),
///         Err(err) => eprintln!("query failed: {err}"),
///     }
/// }
/// ```
#[async_trait]
pub trait BalanceQuery: Send + Sync {
    /// Query the serialized balance for the given API credentials.
    ///
    /// The returned string is an opaque, stable serialization of the
    /// remote balance; the core compares it verbatim for change
    /// detection and never interprets its contents.
    async fn query(&self, key: &str, secret: &str) -> Result<String, ApiError>;
}
