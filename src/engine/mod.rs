pub mod replay;
pub mod tick;
pub mod win_rate;

pub use replay::replay;
pub use tick::apply_tick;
pub use win_rate::{aggregate_score, is_win, score};
