use chrono::{DateTime, Utc};

use crate::models::{
    Direction, EntryRange, NewSignal, PriceObservation, Signal, SignalStatus, Target,
};

/// A signal with the given target levels and stop loss, empty history,
/// fixed creation time.
pub fn make_signal(direction: Direction, levels: &[f64], stop_loss: f64) -> Signal {
    let created_at = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    Signal {
        id: 1,
        channel: "test-channel".to_string(),
        symbol: "BTC".to_string(),
        pair: "BTC/USDT".to_string(),
        direction,
        entry: EntryRange {
            min: 9.0,
            max: 9.5,
            user_entry: None,
        },
        targets: levels.iter().copied().map(Target::new).collect(),
        stop_loss,
        leverage: None,
        price_history: Vec::new(),
        current_price: None,
        reached_count: 0,
        status: SignalStatus::Active,
        updates: Vec::new(),
        created_at,
        updated_at: created_at,
    }
}

/// A NewSignal for store/tracker tests. LONG gets targets [10, 12, 15]
/// with SL 8; SHORT gets [95, 90, 85] with SL 110.
pub fn new_signal(direction: Direction, pair: &str) -> NewSignal {
    let (target_levels, stop_loss) = match direction {
        Direction::Long => (vec![10.0, 12.0, 15.0], 8.0),
        Direction::Short => (vec![95.0, 90.0, 85.0], 110.0),
    };

    NewSignal {
        channel: "test-channel".to_string(),
        symbol: pair.split('/').next().unwrap_or("BTC").to_string(),
        pair: pair.to_string(),
        direction,
        entry: EntryRange {
            min: 9.0,
            max: 9.5,
            user_entry: None,
        },
        target_levels,
        stop_loss,
        leverage: None,
    }
}

pub fn obs(price: f64) -> PriceObservation {
    obs_at(price, Utc::now())
}

pub fn obs_at(price: f64, observed_at: DateTime<Utc>) -> PriceObservation {
    PriceObservation { price, observed_at }
}
