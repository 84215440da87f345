//! Error types for the subscription tracker.
//!
//! Errors are split by concern:
//!
//! - [`ApiError`] - outcomes of the external balance query, classified by
//!   the adapter layer so the poller can dispatch on a tag instead of
//!   matching remote error strings
//! - [`SendError`] - mail delivery failures
//! - [`StoreError`] - snapshot persistence failures
//! - [`TrackerError`] - the unified error returned by the tracker facade
//!
//! Validation-style errors (`DuplicateSubscription`, `NotFound`,
//! `TokenNotFound`) are returned to the caller for user-facing display and
//! are never logged as system faults. `SendError` and `StoreError` are
//! logged where they cannot be surfaced.

mod api;
mod mail;
mod store;
mod tracker;

pub use api::ApiError;
pub use mail::SendError;
pub use store::StoreError;
pub use tracker::TrackerError;
