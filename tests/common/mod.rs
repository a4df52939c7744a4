use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use signal_tracker::error::TrackerError;
use signal_tracker::models::{Direction, EntryRange, NewSignal};
use signal_tracker::price::PriceSource;

/// A price source backed by a fixed pair -> price map. Counts fetches so
/// tests can assert pair deduplication, and fails configured pairs to
/// exercise isolation.
pub struct MockPriceSource {
    prices: Mutex<HashMap<String, f64>>,
    failing: Mutex<Vec<String>>,
    pub fetch_count: AtomicUsize,
}

impl MockPriceSource {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: Mutex::new(
                prices
                    .iter()
                    .map(|(p, v)| (p.to_string(), *v))
                    .collect(),
            ),
            failing: Mutex::new(Vec::new()),
            fetch_count: AtomicUsize::new(0),
        }
    }

    pub fn set_price(&self, pair: &str, price: f64) {
        self.prices.lock().unwrap().insert(pair.to_string(), price);
    }

    pub fn fail_pair(&self, pair: &str) {
        self.failing.lock().unwrap().push(pair.to_string());
    }

    pub fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MockPriceSource {
    async fn fetch_price(&self, pair: &str) -> Result<f64, TrackerError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().iter().any(|p| p == pair) {
            return Err(TrackerError::ProviderUnavailable(format!(
                "{pair}: simulated outage"
            )));
        }

        self.prices
            .lock()
            .unwrap()
            .get(pair)
            .copied()
            .ok_or_else(|| TrackerError::ProviderUnavailable(format!("{pair}: unknown pair")))
    }
}

pub fn long_signal(pair: &str, targets: Vec<f64>, stop_loss: f64) -> NewSignal {
    signal(Direction::Long, pair, targets, stop_loss)
}

pub fn short_signal(pair: &str, targets: Vec<f64>, stop_loss: f64) -> NewSignal {
    signal(Direction::Short, pair, targets, stop_loss)
}

fn signal(direction: Direction, pair: &str, target_levels: Vec<f64>, stop_loss: f64) -> NewSignal {
    NewSignal {
        channel: "integration".to_string(),
        symbol: pair.split('/').next().unwrap_or(pair).to_string(),
        pair: pair.to_string(),
        direction,
        entry: EntryRange {
            min: 0.0,
            max: 0.0,
            user_entry: None,
        },
        target_levels,
        stop_loss,
        leverage: None,
    }
}
