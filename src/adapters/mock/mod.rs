//! Mock capability implementations for testing.

pub mod balance;
pub mod clock;
pub mod mailer;

pub use balance::MockBalanceQuery;
pub use clock::MockClock;
pub use mailer::{MockMailer, SentMail};
