use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::TrackerError;
use crate::models::{NewSignal, Signal, SignalStatus};

/// Reduced projection used by the poller to deduplicate pairs before
/// fetching prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSummary {
    pub id: u64,
    pub pair: String,
    pub status: SignalStatus,
}

/// A signal document plus the version counter backing optimistic
/// concurrency. The version bumps on every successful save.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionedSignal {
    version: u64,
    signal: Signal,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    next_id: u64,
    signals: HashMap<u64, VersionedSignal>,
}

/// In-memory signal store with last-write-wins saves guarded by an
/// optimistic version check, and best-effort JSON snapshots on disk.
pub struct SignalStore {
    state: RwLock<StoreState>,
    snapshot_file: Option<String>,
}

impl SignalStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                next_id: 1,
                signals: HashMap::new(),
            }),
            snapshot_file: None,
        }
    }

    /// Store backed by a JSON snapshot file; loads existing state if the
    /// file is present and parses.
    pub fn with_snapshot(path: &str) -> Self {
        let mut state = StoreState {
            next_id: 1,
            signals: HashMap::new(),
        };

        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str::<StoreState>(&content) {
                Ok(loaded) => {
                    info!(path, signals = loaded.signals.len(), "loaded signal snapshot");
                    state = loaded;
                }
                Err(e) => warn!(path, error = %e, "ignoring unreadable snapshot"),
            }
        }

        Self {
            state: RwLock::new(state),
            snapshot_file: Some(path.to_string()),
        }
    }

    pub async fn insert(&self, new: NewSignal) -> Signal {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let signal = new.into_signal(id, Utc::now());
        state.signals.insert(
            id,
            VersionedSignal {
                version: 1,
                signal: signal.clone(),
            },
        );
        Self::snapshot(&state, self.snapshot_file.as_deref());
        signal
    }

    /// Load a signal plus the version its next save must match.
    pub async fn get(&self, id: u64) -> Result<(Signal, u64), TrackerError> {
        let state = self.state.read().await;
        state
            .signals
            .get(&id)
            .map(|v| (v.signal.clone(), v.version))
            .ok_or(TrackerError::NotFound(id))
    }

    /// Save with an optimistic version check. On a version mismatch the
    /// caller reloads and recomputes; the store never merges.
    pub async fn save(&self, signal: Signal, expected_version: u64) -> Result<(), TrackerError> {
        let mut state = self.state.write().await;
        let entry = state
            .signals
            .get_mut(&signal.id)
            .ok_or(TrackerError::NotFound(signal.id))?;

        if entry.version != expected_version {
            return Err(TrackerError::PersistenceConflict(signal.id));
        }

        entry.version += 1;
        entry.signal = signal;
        Self::snapshot(&state, self.snapshot_file.as_deref());
        Ok(())
    }

    /// All signals the scheduled poller should evaluate (ACTIVE/PARTIAL),
    /// as a reduced projection for the pair-dedup step.
    pub async fn evaluable(&self) -> Vec<SignalSummary> {
        let state = self.state.read().await;
        let mut summaries: Vec<SignalSummary> = state
            .signals
            .values()
            .filter(|v| v.signal.status.is_evaluable())
            .map(|v| SignalSummary {
                id: v.signal.id,
                pair: v.signal.pair.clone(),
                status: v.signal.status,
            })
            .collect();
        summaries.sort_by_key(|s| s.id);
        summaries
    }

    pub async fn all(&self) -> Vec<Signal> {
        let state = self.state.read().await;
        let mut signals: Vec<Signal> = state.signals.values().map(|v| v.signal.clone()).collect();
        signals.sort_by_key(|s| s.id);
        signals
    }

    pub async fn delete(&self, id: u64) -> Result<(), TrackerError> {
        let mut state = self.state.write().await;
        state
            .signals
            .remove(&id)
            .map(|_| ())
            .ok_or(TrackerError::NotFound(id))?;
        Self::snapshot(&state, self.snapshot_file.as_deref());
        Ok(())
    }

    fn snapshot(state: &StoreState, path: Option<&str>) {
        let Some(path) = path else { return };

        if let Some(parent) = Path::new(path).parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(state) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!(path, error = %e, "snapshot write failed");
                }
            }
            Err(e) => warn!(path, error = %e, "snapshot serialize failed"),
        }
    }
}

impl Default for SignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use crate::test_helpers::new_signal;

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = SignalStore::new();
        let a = store.insert(new_signal(Direction::Long, "BTC/USDT")).await;
        let b = store.insert(new_signal(Direction::Short, "ETH/USDT")).await;
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let store = SignalStore::new();
        let err = store.get(42).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(42)));
    }

    #[tokio::test]
    async fn save_bumps_version_and_detects_conflict() {
        let store = SignalStore::new();
        let sig = store.insert(new_signal(Direction::Long, "BTC/USDT")).await;

        let (loaded, v1) = store.get(sig.id).await.unwrap();
        assert_eq!(v1, 1);
        store.save(loaded.clone(), v1).await.unwrap();

        // Stale version now conflicts.
        let err = store.save(loaded, v1).await.unwrap_err();
        assert!(matches!(err, TrackerError::PersistenceConflict(_)));

        let (_, v2) = store.get(sig.id).await.unwrap();
        assert_eq!(v2, 2);
    }

    #[tokio::test]
    async fn evaluable_filters_terminal_statuses() {
        let store = SignalStore::new();
        let a = store.insert(new_signal(Direction::Long, "BTC/USDT")).await;
        let b = store.insert(new_signal(Direction::Long, "ETH/USDT")).await;

        let (mut stopped, v) = store.get(b.id).await.unwrap();
        stopped.status = SignalStatus::Stopped;
        store.save(stopped, v).await.unwrap();

        let summaries = store.evaluable().await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, a.id);
        assert_eq!(summaries[0].pair, "BTC/USDT");
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_disk() {
        let path = std::env::temp_dir()
            .join(format!("signal_tracker_store_{}.json", std::process::id()))
            .to_string_lossy()
            .to_string();
        let _ = std::fs::remove_file(&path);

        {
            let store = SignalStore::with_snapshot(&path);
            store.insert(new_signal(Direction::Long, "BTC/USDT")).await;
        }

        let reloaded = SignalStore::with_snapshot(&path);
        let all = reloaded.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].pair, "BTC/USDT");
        // Id counter survives the round trip.
        let next = reloaded.insert(new_signal(Direction::Short, "ETH/USDT")).await;
        assert_eq!(next.id, 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn delete_removes_signal() {
        let store = SignalStore::new();
        let sig = store.insert(new_signal(Direction::Long, "BTC/USDT")).await;
        store.delete(sig.id).await.unwrap();
        assert!(store.get(sig.id).await.is_err());
        assert!(matches!(
            store.delete(sig.id).await.unwrap_err(),
            TrackerError::NotFound(_)
        ));
    }
}
