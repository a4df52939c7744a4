use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use signal_tracker::config::Config;
use signal_tracker::poller::PricePoller;
use signal_tracker::price::MexcClient;
use signal_tracker::store::SignalStore;
use signal_tracker::tracker::SignalTracker;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let store = Arc::new(SignalStore::with_snapshot(&cfg.state_file));
    let tracker = Arc::new(SignalTracker::new(store));
    let source = Arc::new(MexcClient::new(&cfg)?);

    let poller = PricePoller::new(Arc::clone(&tracker), source, &cfg);
    let handle = poller.start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    handle.stop().await;

    Ok(())
}
