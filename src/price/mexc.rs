use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;
use crate::error::TrackerError;
use crate::price::PriceSource;

#[derive(Debug, Deserialize)]
struct FairPriceResponse {
    success: bool,
    #[serde(default)]
    data: Option<FairPriceData>,
}

#[derive(Debug, Deserialize)]
struct FairPriceData {
    #[serde(rename = "fairPrice")]
    fair_price: f64,
}

/// MEXC contract fair-price client. The endpoint is public, so no request
/// signing is needed.
pub struct MexcClient {
    client: Client,
    base_url: String,
}

impl MexcClient {
    /// Fails rather than fall back to a client without the bounded fetch
    /// timeout.
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.fetch_timeout)
            .build()
            .context("failed to build MEXC HTTP client")?;

        Ok(Self {
            client,
            base_url: cfg.mexc_base_url.clone(),
        })
    }

    /// "BTC/USDT" -> "BTC_USDT" (MEXC contract symbol form).
    pub fn contract_symbol(pair: &str) -> Result<String, TrackerError> {
        let pair = pair.trim();
        if pair.is_empty() {
            return Err(TrackerError::InvalidObservation(
                "missing trading pair".to_string(),
            ));
        }
        Ok(pair.replace('/', "_").to_uppercase())
    }
}

#[async_trait]
impl PriceSource for MexcClient {
    async fn fetch_price(&self, pair: &str) -> Result<f64, TrackerError> {
        let symbol = Self::contract_symbol(pair)?;
        let url = format!("{}/contract/fair_price/{}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TrackerError::ProviderUnavailable(format!("{pair}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TrackerError::ProviderUnavailable(format!(
                "{pair}: HTTP {status}"
            )));
        }

        let body: FairPriceResponse = resp
            .json()
            .await
            .map_err(|e| TrackerError::ProviderUnavailable(format!("{pair}: {e}")))?;

        match body.data {
            Some(data) if body.success && data.fair_price > 0.0 => Ok(data.fair_price),
            _ => {
                warn!(pair, "no fair price in MEXC response");
                Err(TrackerError::ProviderUnavailable(format!(
                    "{pair}: no fair price in response"
                )))
            }
        }
    }
}
