pub mod direction;
pub mod signal;

pub use direction::{Direction, SignalStatus};
pub use signal::{
    EntryRange, NewSignal, PriceObservation, Signal, SignalUpdate, Target, UpdateKind,
};
