//! Capability adapters.
//!
//! Production implementations of the traits in [`crate::traits`], plus
//! mock implementations for testing under [`mock`].

pub mod kraken;
pub mod mail_api;
pub mod mock;

pub use kraken::KrakenBalanceClient;
pub use mail_api::MailApiClient;
