use tracing::debug;

use crate::error::TrackerError;
use crate::models::{Direction, PriceObservation, Signal, SignalStatus, UpdateKind};

/// Apply one new price observation to a signal, mutating targets, status
/// and the reached count in place. Returns how many targets this tick
/// newly reached.
///
/// The observation's timestamp may be backdated (manual entry of a past
/// price); it is appended to the history as-is, never insert-sorted.
pub fn apply_tick(
    signal: &mut Signal,
    observation: PriceObservation,
) -> Result<usize, TrackerError> {
    validate(&observation)?;

    let price = observation.price;
    let at = observation.observed_at;

    signal.price_history.push(observation);
    signal.current_price = Some(price);
    signal.updated_at = at;

    // STOPPED is terminal: keep ingesting prices but never touch targets
    // or status again.
    if signal.status == SignalStatus::Stopped {
        debug!(signal = signal.id, price, "tick on stopped signal ignored");
        return Ok(0);
    }

    let newly_reached = reach_targets(signal, price, at);
    signal.reached_count += newly_reached;
    debug_assert_eq!(signal.reached_count, signal.count_reached());

    signal.status = next_status(signal, price);
    if signal.status == SignalStatus::Stopped {
        signal.push_update(
            UpdateKind::SlHit,
            format!("Stop loss hit at price {price}"),
            at,
        );
    }

    Ok(newly_reached)
}

/// Walk unreached targets in index order and mark every one the price
/// crosses. A single tick can jump through several levels at once.
pub(crate) fn reach_targets(
    signal: &mut Signal,
    price: f64,
    at: chrono::DateTime<chrono::Utc>,
) -> usize {
    let is_long = signal.direction.is_long();
    let mut reached_now = Vec::new();

    for (i, target) in signal.targets.iter_mut().enumerate() {
        if target.reached {
            continue;
        }
        let hit = if is_long {
            price >= target.level
        } else {
            price <= target.level
        };
        if hit {
            target.reached = true;
            target.reached_at = Some(at);
            reached_now.push(i);
        }
    }

    for i in &reached_now {
        signal.push_update(
            UpdateKind::TpReached,
            format!("TP{} reached at price {price}", i + 1),
            at,
        );
    }

    reached_now.len()
}

/// The status transition function, evaluated after every tick. The stop
/// loss check is independent of target reaching on the same tick and its
/// assignment wins.
pub(crate) fn next_status(signal: &Signal, price: f64) -> SignalStatus {
    let stop_hit = match signal.direction {
        Direction::Long => price <= signal.stop_loss,
        Direction::Short => price >= signal.stop_loss,
    };

    if stop_hit {
        SignalStatus::Stopped
    } else if signal.reached_count == 0 {
        SignalStatus::Active
    } else if signal.reached_count == signal.targets.len() {
        SignalStatus::Completed
    } else {
        SignalStatus::Partial
    }
}

fn validate(observation: &PriceObservation) -> Result<(), TrackerError> {
    if !observation.price.is_finite() || observation.price <= 0.0 {
        return Err(TrackerError::InvalidObservation(format!(
            "price must be a finite positive number, got {}",
            observation.price
        )));
    }
    Ok(())
}
