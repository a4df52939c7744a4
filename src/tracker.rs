use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::engine::{apply_tick, replay};
use crate::error::TrackerError;
use crate::models::{NewSignal, PriceObservation, Signal};
use crate::store::SignalStore;

/// Outcome of applying one observation, reported back to callers so they
/// can surface "N target(s) reached".
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub signal: Signal,
    pub newly_reached: usize,
}

/// The in-process API over store + evaluators. Every mutation is a
/// load-evaluate-save unit; a version conflict triggers exactly one
/// recompute against freshly loaded state before surfacing.
pub struct SignalTracker {
    store: Arc<SignalStore>,
    /// Pending saves forced to conflict, for exercising the retry path.
    #[cfg(test)]
    forced_conflicts: std::sync::atomic::AtomicUsize,
}

impl SignalTracker {
    pub fn new(store: Arc<SignalStore>) -> Self {
        Self {
            store,
            #[cfg(test)]
            forced_conflicts: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<SignalStore> {
        &self.store
    }

    pub async fn create(&self, new: NewSignal) -> Result<Signal, TrackerError> {
        if new.pair.trim().is_empty() {
            return Err(TrackerError::InvalidObservation(
                "missing trading pair".to_string(),
            ));
        }
        let signal = self.store.insert(new).await;
        info!(signal = signal.id, pair = %signal.pair, "signal created");
        Ok(signal)
    }

    /// Apply one price observation to a signal. `at` defaults to now;
    /// callers may backdate it for manual historical entries.
    pub async fn apply_observation(
        &self,
        id: u64,
        price: f64,
        at: Option<DateTime<Utc>>,
    ) -> Result<TickOutcome, TrackerError> {
        let observation = PriceObservation {
            price,
            observed_at: at.unwrap_or_else(Utc::now),
        };

        self.mutate(id, move |signal| {
            apply_tick(signal, observation.clone())
        })
        .await
    }

    /// Replace a historical observation, then rebuild derived state.
    pub async fn edit_price(
        &self,
        id: u64,
        index: usize,
        price: f64,
        at: DateTime<Utc>,
    ) -> Result<Signal, TrackerError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(TrackerError::InvalidObservation(format!(
                "price must be a finite positive number, got {price}"
            )));
        }

        let outcome = self
            .mutate(id, move |signal| {
                let entry = signal.price_history.get_mut(index).ok_or_else(|| {
                    TrackerError::InvalidObservation(format!(
                        "no price entry at index {index}"
                    ))
                })?;
                entry.price = price;
                entry.observed_at = at;
                replay(signal);
                Ok(0)
            })
            .await?;
        Ok(outcome.signal)
    }

    /// Remove a historical observation, then rebuild derived state.
    pub async fn delete_price(&self, id: u64, index: usize) -> Result<Signal, TrackerError> {
        let outcome = self
            .mutate(id, move |signal| {
                if index >= signal.price_history.len() {
                    return Err(TrackerError::InvalidObservation(format!(
                        "no price entry at index {index}"
                    )));
                }
                signal.price_history.remove(index);
                replay(signal);
                Ok(0)
            })
            .await?;
        Ok(outcome.signal)
    }

    /// Full deterministic recomputation from the stored history.
    pub async fn replay_from_history(&self, id: u64) -> Result<Signal, TrackerError> {
        let outcome = self
            .mutate(id, |signal| {
                replay(signal);
                Ok(0)
            })
            .await?;
        Ok(outcome.signal)
    }

    /// Load-evaluate-save with a single retry on version conflict. The
    /// closure runs against a fresh copy on retry, so a half-applied
    /// mutation never reaches the store.
    async fn mutate<F>(&self, id: u64, op: F) -> Result<TickOutcome, TrackerError>
    where
        F: Fn(&mut Signal) -> Result<usize, TrackerError>,
    {
        for attempt in 0..2 {
            let (mut signal, version) = self.store.get(id).await?;
            let newly_reached = op(&mut signal)?;

            match self.save(signal.clone(), version).await {
                Ok(()) => {
                    return Ok(TickOutcome {
                        signal,
                        newly_reached,
                    })
                }
                Err(TrackerError::PersistenceConflict(_)) if attempt == 0 => {
                    debug!(signal = id, "version conflict, recomputing once");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(TrackerError::PersistenceConflict(id))
    }

    async fn save(&self, signal: Signal, expected_version: u64) -> Result<(), TrackerError> {
        #[cfg(test)]
        {
            use std::sync::atomic::Ordering;
            if self.forced_conflicts.load(Ordering::SeqCst) > 0 {
                self.forced_conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(TrackerError::PersistenceConflict(signal.id));
            }
        }
        self.store.save(signal, expected_version).await
    }
}
