//! Persistence through the Supabase REST (PostgREST) API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use crate::error::{ImportError, Result};
use crate::models::{Candle, ImportRun};
use crate::sink::{CandleSink, IMPORT_LOGS_TABLE, TIME_COLUMN};

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, service_role_key: &str, timeout_secs: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(service_role_key)
            .map_err(|_| ImportError::Configuration("SERVICE_ROLE_KEY is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", service_role_key))
            .map_err(|_| ImportError::Configuration("SERVICE_ROLE_KEY is not a valid header value".to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ImportError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn post<T: Serialize + ?Sized>(&self, request: reqwest::RequestBuilder, body: &T) -> Result<()> {
        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| ImportError::Persistence(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(ImportError::Persistence(format!("{}: {}", status, detail)))
    }
}

#[async_trait]
impl CandleSink for SupabaseClient {
    async fn upsert_candles(&self, table: &str, candles: &[Candle]) -> Result<u64> {
        debug!(table, rows = candles.len(), "Upserting candles");

        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", TIME_COLUMN)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal");
        self.post(request, candles).await?;

        Ok(candles.len() as u64)
    }

    async fn insert_import_log(&self, run: &ImportRun) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(IMPORT_LOGS_TABLE))
            .header("Prefer", "return=minimal");
        self.post(request, run).await
    }
}
