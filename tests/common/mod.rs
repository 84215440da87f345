//! Shared helpers for integration tests.

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use saldo::adapters::mock::{MockBalanceQuery, MockClock, MockMailer};
use saldo::config::{Config, MailConfig};
use saldo::tracker::Tracker;
use saldo::traits::Clock;

/// A tracker wired to mock capabilities over a temp-dir snapshot file.
pub struct Harness {
    pub tracker: Arc<Tracker>,
    pub api: MockBalanceQuery,
    pub mailer: MockMailer,
    pub clock: MockClock,
    /// Keeps the snapshot directory alive for the test's duration.
    pub dir: Arc<TempDir>,
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        public_url: "https://saldo.test".to_string(),
        storage_file: dir.path().join("state.json"),
        poll_interval_secs: 600,
        pending_ttl_hours: 48,
        api_url: String::new(),
        mail: MailConfig {
            endpoint: String::new(),
            api_token: String::new(),
            from: "noreply@saldo.test".to_string(),
            subject: "Saldo notification".to_string(),
        },
    }
}

/// Build a loaded tracker over fresh mocks and an empty snapshot.
pub async fn harness() -> Harness {
    let dir = Arc::new(tempfile::tempdir().unwrap());
    let config = test_config(&dir);
    let api = MockBalanceQuery::new();
    let mailer = MockMailer::new();
    let clock = MockClock::new(Utc::now());

    let tracker = Arc::new(Tracker::new(
        &config,
        Arc::new(api.clone()),
        Arc::new(mailer.clone()),
        Arc::new(clock.clone()),
    ));
    tracker.load().await.unwrap();

    Harness {
        tracker,
        api,
        mailer,
        clock,
        dir,
    }
}

/// Build a second tracker over the same snapshot file, simulating a
/// process restart. The mocks are fresh.
pub async fn restart(harness: &Harness) -> Harness {
    let dir = Arc::clone(&harness.dir);
    let config = test_config(&dir);

    let api = MockBalanceQuery::new();
    let mailer = MockMailer::new();
    let clock = MockClock::new(harness.clock.now());

    let tracker = Arc::new(Tracker::new(
        &config,
        Arc::new(api.clone()),
        Arc::new(mailer.clone()),
        Arc::new(clock.clone()),
    ));
    tracker.load().await.unwrap();

    Harness {
        tracker,
        api,
        mailer,
        clock,
        dir,
    }
}

/// Pull the confirmation token out of a mailed link.
pub fn token_from(body: &str) -> String {
    let start = body.find("token=").expect("mail body contains a confirmation link") + "token=".len();
    body[start..start + 64].to_string()
}

/// Run the full double-opt-in flow for one subscription.
pub async fn subscribe(harness: &Harness, mail: &str, key: &str, secret: &str) {
    harness.tracker.add_request(mail, key, secret).await.unwrap();
    let token = token_from(&harness.mailer.last().unwrap().body);
    harness.tracker.confirm(&token).await.unwrap();
    harness.mailer.clear();
}
