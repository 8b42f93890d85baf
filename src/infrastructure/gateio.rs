//! Gate.io public REST API clients

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::shared::errors::FetchError;
use crate::shared::types::Sample;
use crate::shared::utils::lenient_f64;

/// A polled market-data endpoint. One successful call yields one
/// snapshot per tracked instrument; there is no internal retry - the
/// scheduler's next tick is the retry mechanism.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, instruments: &[String])
        -> Result<HashMap<String, Sample>, FetchError>;
}

/// Build the shared HTTP client with the deployment's request timeout
pub fn build_http_client(timeout_secs: u64) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Raw spot ticker object; numerics arrive as strings or numbers
#[derive(Debug, Deserialize)]
struct SpotTickerRaw {
    currency_pair: String,
    #[serde(default)]
    last: serde_json::Value,
    #[serde(default)]
    change_percentage: serde_json::Value,
    #[serde(default)]
    base_volume: serde_json::Value,
}

/// Raw futures contract object
#[derive(Debug, Deserialize)]
struct FuturesContractRaw {
    name: String,
    #[serde(default)]
    funding_rate: serde_json::Value,
}

fn map_spot(tickers: Vec<SpotTickerRaw>, instruments: &[String]) -> HashMap<String, Sample> {
    let now = Utc::now();
    tickers
        .into_iter()
        .filter(|t| instruments.iter().any(|i| *i == t.currency_pair))
        .map(|t| {
            let sample = Sample {
                instrument: t.currency_pair.clone(),
                value: lenient_f64(&t.last),
                change_24h: Some(lenient_f64(&t.change_percentage)),
                volume: Some(lenient_f64(&t.base_volume)),
                time: now,
            };
            (t.currency_pair, sample)
        })
        .collect()
}

fn map_futures(
    contracts: Vec<FuturesContractRaw>,
    instruments: &[String],
) -> HashMap<String, Sample> {
    let now = Utc::now();
    contracts
        .into_iter()
        .filter(|c| instruments.iter().any(|i| *i == c.name))
        .map(|c| {
            let sample = Sample {
                instrument: c.name.clone(),
                value: lenient_f64(&c.funding_rate),
                change_24h: None,
                volume: None,
                time: now,
            };
            (c.name, sample)
        })
        .collect()
}

/// Spot ticker client: last price, 24h change percentage, base volume
pub struct GateioSpotSource {
    http_client: Client,
    base_url: String,
}

impl GateioSpotSource {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MarketDataSource for GateioSpotSource {
    async fn fetch(
        &self,
        instruments: &[String],
    ) -> Result<HashMap<String, Sample>, FetchError> {
        let url = format!("{}/spot/tickers", self.base_url);
        debug!("Fetching spot tickers from {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let tickers: Vec<SpotTickerRaw> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(map_spot(tickers, instruments))
    }
}

/// USDT perpetual contract client: funding rate per contract
pub struct GateioFuturesSource {
    http_client: Client,
    base_url: String,
}

impl GateioFuturesSource {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MarketDataSource for GateioFuturesSource {
    async fn fetch(
        &self,
        instruments: &[String],
    ) -> Result<HashMap<String, Sample>, FetchError> {
        let url = format!("{}/futures/usdt/contracts", self.base_url);
        debug!("Fetching funding rates from {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let contracts: Vec<FuturesContractRaw> = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(map_futures(contracts, instruments))
    }
}
