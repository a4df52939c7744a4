use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::TrackerError;
use crate::price::PriceSource;
use crate::tracker::SignalTracker;

/// Fixed-interval price poller. Each pass fetches one price per distinct
/// pair, then applies a tick to every eligible signal in parallel. A
/// failure for one pair or signal never aborts the rest of the pass.
pub struct PricePoller {
    tracker: Arc<SignalTracker>,
    source: Arc<dyn PriceSource>,
    interval: std::time::Duration,
}

/// Owned handle to a running poller. Dropping or stopping it halts future
/// passes; in-flight work for the current pass is allowed to finish.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "poller task join failed");
        }
    }
}

impl PricePoller {
    pub fn new(tracker: Arc<SignalTracker>, source: Arc<dyn PriceSource>, cfg: &Config) -> Self {
        Self {
            tracker,
            source,
            interval: cfg.poll_interval,
        }
    }

    /// Spawn the recurring evaluation loop.
    pub fn start(self) -> PollerHandle {
        let (shutdown, mut watch_rx) = watch::channel(false);
        info!(interval_secs = self.interval.as_secs(), "price poller started");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_pass().await;
                    }
                    _ = watch_rx.changed() => {
                        if *watch_rx.borrow() {
                            info!("price poller stopped");
                            return;
                        }
                    }
                }
            }
        });

        PollerHandle { shutdown, task }
    }

    /// One evaluation pass. Public so tests can drive the poller without
    /// the timer.
    pub async fn run_pass(&self) {
        let summaries = self.tracker.store().evaluable().await;
        if summaries.is_empty() {
            debug!("no evaluable signals");
            return;
        }

        // One fetch per distinct pair, fanned back out to the signals.
        let mut pairs: Vec<String> = summaries.iter().map(|s| s.pair.clone()).collect();
        pairs.sort();
        pairs.dedup();

        info!(
            signals = summaries.len(),
            pairs = pairs.len(),
            "evaluation pass"
        );

        let prices = self.fetch_pairs(&pairs).await;

        let mut tasks = Vec::new();
        for summary in summaries {
            let Some(&price) = prices.get(&summary.pair) else {
                // Fetch failed for this pair; skip and retry next pass.
                continue;
            };
            let tracker = Arc::clone(&self.tracker);
            tasks.push(tokio::spawn(async move {
                match tracker.apply_observation(summary.id, price, None).await {
                    Ok(out) => {
                        if out.newly_reached > 0 {
                            info!(
                                signal = summary.id,
                                pair = %summary.pair,
                                price,
                                newly_reached = out.newly_reached,
                                status = %out.signal.status,
                                "target(s) reached"
                            );
                        } else {
                            debug!(signal = summary.id, pair = %summary.pair, price, "price applied");
                        }
                    }
                    Err(e) => {
                        warn!(signal = summary.id, error = %e, "tick skipped");
                    }
                }
            }));
        }

        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "evaluation task panicked");
            }
        }
    }

    async fn fetch_pairs(&self, pairs: &[String]) -> HashMap<String, f64> {
        let mut fetches = Vec::new();
        for pair in pairs {
            let source = Arc::clone(&self.source);
            let pair = pair.clone();
            fetches.push(tokio::spawn(async move {
                let result = source.fetch_price(&pair).await;
                (pair, result)
            }));
        }

        let mut prices = HashMap::new();
        for fetch in fetches {
            match fetch.await {
                Ok((pair, Ok(price))) => {
                    prices.insert(pair, price);
                }
                Ok((pair, Err(TrackerError::ProviderUnavailable(msg)))) => {
                    warn!(pair = %pair, error = %msg, "price fetch failed, pair skipped this pass");
                }
                Ok((pair, Err(e))) => {
                    warn!(pair = %pair, error = %e, "price fetch rejected");
                }
                Err(e) => {
                    error!(error = %e, "price fetch task panicked");
                }
            }
        }
        prices
    }
}
