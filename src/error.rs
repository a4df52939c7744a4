use thiserror::Error;

/// Caller-visible failures. Evaluator invariants breaking is a programming
/// error and panics instead of mapping to one of these.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Rejected before any mutation: non-finite/non-positive price,
    /// out-of-range history index, or a missing pair.
    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    #[error("signal {0} not found")]
    NotFound(u64),

    /// Price fetch failed or timed out. The signal is skipped for the
    /// current pass and retried on the next one.
    #[error("price provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Concurrent write detected and the single retry also conflicted.
    #[error("conflicting concurrent update for signal {0}")]
    PersistenceConflict(u64),
}
