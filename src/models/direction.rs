use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Direction {
    pub fn is_long(&self) -> bool {
        matches!(self, Direction::Long)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

/// Lifecycle status of a signal. A signal starts ACTIVE, moves to PARTIAL
/// once at least one target is reached, COMPLETED when all are reached,
/// and STOPPED when the stop loss is hit. STOPPED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStatus {
    Active,
    Partial,
    Completed,
    Stopped,
}

impl SignalStatus {
    /// Whether the scheduled poller should still feed prices to this signal.
    pub fn is_evaluable(&self) -> bool {
        matches!(self, SignalStatus::Active | SignalStatus::Partial)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Active => "ACTIVE",
            SignalStatus::Partial => "PARTIAL",
            SignalStatus::Completed => "COMPLETED",
            SignalStatus::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluable_statuses() {
        assert!(SignalStatus::Active.is_evaluable());
        assert!(SignalStatus::Partial.is_evaluable());
        assert!(!SignalStatus::Completed.is_evaluable());
        assert!(!SignalStatus::Stopped.is_evaluable());
    }

    #[test]
    fn serde_uses_uppercase_tags() {
        let s = serde_json::to_string(&SignalStatus::Partial).unwrap();
        assert_eq!(s, "\"PARTIAL\"");
        let d = serde_json::to_string(&Direction::Short).unwrap();
        assert_eq!(d, "\"SHORT\"");
    }
}
