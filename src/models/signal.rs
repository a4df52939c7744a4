use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Direction, SignalStatus};

/// Entry zone for the trade. Informational only — the evaluator never
/// compares prices against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub user_entry: Option<f64>,
}

/// A take-profit level. Targets are ordered by distance from entry in the
/// direction of profit (index 0 = nearest) and are never re-sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub level: f64,
    #[serde(default)]
    pub reached: bool,
    #[serde(default)]
    pub reached_at: Option<DateTime<Utc>>,
}

impl Target {
    pub fn new(level: f64) -> Self {
        Self {
            level,
            reached: false,
            reached_at: None,
        }
    }
}

/// One observed price for the signal's pair. Observations are stored in
/// insertion order; `observed_at` defines the canonical evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservation {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateKind {
    TpReached,
    SlHit,
    Update,
}

/// Append-only human-readable lifecycle log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalUpdate {
    pub message: String,
    pub kind: UpdateKind,
    pub timestamp: DateTime<Utc>,
}

/// A tracked directional trade call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: u64,
    pub channel: String,
    pub symbol: String,
    /// Normalized "BASE/QUOTE" pair, e.g. "BTC/USDT".
    pub pair: String,
    pub direction: Direction,
    pub entry: EntryRange,
    pub targets: Vec<Target>,
    pub stop_loss: f64,
    #[serde(default)]
    pub leverage: Option<String>,
    #[serde(default)]
    pub price_history: Vec<PriceObservation>,
    /// Price of the most recently *inserted* observation, independent of
    /// its timestamp.
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub reached_count: usize,
    pub status: SignalStatus,
    #[serde(default)]
    pub updates: Vec<SignalUpdate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Signal {
    pub fn push_update(&mut self, kind: UpdateKind, message: String, at: DateTime<Utc>) {
        self.updates.push(SignalUpdate {
            message,
            kind,
            timestamp: at,
        });
    }

    /// Index order of `price_history` sorted by `observed_at` ascending.
    /// The sort is stable, so equal timestamps keep insertion order.
    pub fn chronological_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.price_history.len()).collect();
        order.sort_by_key(|&i| self.price_history[i].observed_at);
        order
    }

    /// Count of reached targets derived from the targets themselves.
    /// Must always agree with `reached_count`.
    pub fn count_reached(&self) -> usize {
        self.targets.iter().filter(|t| t.reached).count()
    }

    pub fn highest_reached_index(&self) -> Option<usize> {
        self.targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.reached)
            .map(|(i, _)| i)
            .last()
    }
}

/// Fields required to create a signal; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSignal {
    pub channel: String,
    pub symbol: String,
    pub pair: String,
    pub direction: Direction,
    pub entry: EntryRange,
    pub target_levels: Vec<f64>,
    pub stop_loss: f64,
    #[serde(default)]
    pub leverage: Option<String>,
}

impl NewSignal {
    pub fn into_signal(self, id: u64, now: DateTime<Utc>) -> Signal {
        Signal {
            id,
            channel: self.channel,
            symbol: self.symbol,
            pair: self.pair,
            direction: self.direction,
            entry: self.entry,
            targets: self.target_levels.into_iter().map(Target::new).collect(),
            stop_loss: self.stop_loss,
            leverage: self.leverage,
            price_history: Vec::new(),
            current_price: None,
            reached_count: 0,
            status: SignalStatus::Active,
            updates: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
