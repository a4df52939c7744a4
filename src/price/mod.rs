pub mod mexc;

pub use mexc::MexcClient;

use async_trait::async_trait;

use crate::error::TrackerError;

/// Supplies one normalized price for a "BASE/QUOTE" trading pair.
/// Provider-specific symbol translation lives behind this seam.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, pair: &str) -> Result<f64, TrackerError>;
}
