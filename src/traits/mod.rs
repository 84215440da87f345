//! Capability traits consumed by the tracker core.
//!
//! The core never talks to the outside world directly; it goes through
//! these traits, enabling dependency injection and mocking in tests.
//!
//! # Traits
//!
//! - [`BalanceQuery`] - the external balance API
//! - [`Mailer`] - the mail transport
//! - [`Clock`] - the current time

pub mod balance;
pub mod clock;
pub mod mailer;

pub use balance::BalanceQuery;
pub use clock::{Clock, SystemClock};
pub use mailer::Mailer;
