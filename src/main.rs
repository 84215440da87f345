//! saldo daemon entry point.

use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use saldo::adapters::{KrakenBalanceClient, MailApiClient};
use saldo::config::Config;
use saldo::tracker::Tracker;
use saldo::traits::SystemClock;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = Config::resolve_path()?;
    let config = Config::load(&config_path)
        .wrap_err_with(|| format!("failed to load config from {}", config_path.display()))?;

    let balance = Arc::new(KrakenBalanceClient::with_base_url(config.api_url.clone()));
    let mailer = Arc::new(MailApiClient::new(
        config.mail.endpoint.clone(),
        config.mail.api_token.clone(),
        config.mail.from.clone(),
    ));

    let tracker = Arc::new(Tracker::new(
        &config,
        balance,
        mailer,
        Arc::new(SystemClock),
    ));
    Arc::clone(&tracker).start().await?;

    tracing::info!(
        interval_secs = config.poll_interval_secs,
        storage = %config.storage_file.display(),
        "saldo started"
    );

    tokio::signal::ctrl_c()
        .await
        .wrap_err("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");
    Ok(())
}
