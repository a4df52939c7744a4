use crate::models::Signal;

const TP1_SCORE: f64 = 0.3;
const TP2_SCORE: f64 = 0.6;
const TP3_PLUS_SCORE: f64 = 1.0;

/// Tiered win-rate score for one signal, in {0, 0.3, 0.6, 1.0}.
///
/// Driven purely by the *highest* reached target index, not the count, so
/// it stays well-defined for any reaching pattern: TP1 only -> 0.3, TP2
/// (with or without TP1) -> 0.6, TP3 or beyond -> 1.0.
pub fn score(signal: &Signal) -> f64 {
    match signal.highest_reached_index() {
        None => 0.0,
        Some(0) => TP1_SCORE,
        Some(1) => TP2_SCORE,
        Some(_) => TP3_PLUS_SCORE,
    }
}

pub fn is_win(signal: &Signal) -> bool {
    score(signal) > 0.0
}

/// Mean score across a collection of signals; 0 for an empty slice.
pub fn aggregate_score(signals: &[Signal]) -> f64 {
    if signals.is_empty() {
        return 0.0;
    }
    signals.iter().map(score).sum::<f64>() / signals.len() as f64
}
