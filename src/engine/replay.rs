use tracing::debug;

use crate::engine::tick::{next_status, reach_targets};
use crate::models::{Signal, SignalStatus, UpdateKind};

/// Deterministically rebuild a signal's derived state from its stored
/// price history. Used after a historical observation is edited or
/// deleted — never on a normal append.
///
/// Unlike the incremental tick path there is no carry-over: all targets
/// and the status are reset first, then observations are replayed in
/// `observed_at` order (stable on insertion order for equal timestamps).
/// The moment any observation trips the stop loss the replay halts;
/// price action after a historical stop-out is irrelevant.
pub fn replay(signal: &mut Signal) {
    for target in &mut signal.targets {
        target.reached = false;
        target.reached_at = None;
    }
    signal.reached_count = 0;
    signal.status = SignalStatus::Active;

    // Iteration order only; the stored history keeps insertion order.
    let order = signal.chronological_indices();

    for idx in order {
        let obs = signal.price_history[idx].clone();
        let newly = reach_targets(signal, obs.price, obs.observed_at);
        signal.reached_count += newly;

        signal.status = next_status(signal, obs.price);
        if signal.status == SignalStatus::Stopped {
            signal.push_update(
                UpdateKind::SlHit,
                format!("Stop loss hit at price {}", obs.price),
                obs.observed_at,
            );
            debug!(
                signal = signal.id,
                price = obs.price,
                "replay halted on stop loss"
            );
            break;
        }
    }

    debug_assert_eq!(signal.reached_count, signal.count_reached());

    // Latest-inserted observation drives the displayed price, same as the
    // online path. With no surviving history the signal reads as freshly
    // created.
    match signal.price_history.last() {
        Some(last) => {
            signal.current_price = Some(last.price);
            signal.updated_at = last.observed_at;
        }
        None => {
            signal.current_price = None;
            signal.updated_at = signal.created_at;
        }
    }
}
