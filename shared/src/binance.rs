//! Binance spot klines client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::chunker::Batch;
use crate::error::{ImportError, Result};
use crate::models::Candle;

pub const DAILY_INTERVAL: &str = "1d";
/// Binance caps a klines response at 1000 rows.
pub const KLINES_LIMIT: u32 = 1000;

/// Anything that can produce the daily candles for one batch.
#[async_trait]
pub trait CandleSource: Send + Sync {
    async fn fetch_daily(&self, symbol: &str, batch: &Batch) -> Result<Vec<Candle>>;
}

#[derive(Debug, Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ImportError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    async fn fetch_daily(&self, symbol: &str, batch: &Batch) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        debug!(%url, symbol, start = %batch.start, end = %batch.end, "Requesting klines");

        let body: Value = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_uppercase()),
                ("interval", DAILY_INTERVAL.to_string()),
                ("startTime", batch.start_millis().to_string()),
                ("endTime", batch.end_millis().to_string()),
                ("limit", KLINES_LIMIT.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        parse_klines(&body)
    }
}

/// Turns a klines response body into candles. Anything other than an array
/// means the API answered with an error object.
pub fn parse_klines(body: &Value) -> Result<Vec<Candle>> {
    let rows = body
        .as_array()
        .ok_or_else(|| ImportError::Fetch(format!("expected an array of klines, got {}", body)))?;

    rows.iter().map(Candle::from_kline_row).collect()
}
