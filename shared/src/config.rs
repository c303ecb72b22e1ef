use chrono::NaiveDate;
use dotenv::dotenv;

use crate::error::{ImportError, Result};

pub const DEFAULT_BINANCE_API_URL: &str = "https://api.binance.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub service_role_key: String,
    pub start_date: NaiveDate,
    asset_symbol: String,
    pub binance_api_url: String,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. `from_env` is this over
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ImportError::Configuration(format!("{} must be set", key))
                })
        };
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let raw_start = required("START_DATE")?;
        let start_date = NaiveDate::parse_from_str(&raw_start, "%Y-%m-%d").map_err(|e| {
            ImportError::Configuration(format!(
                "START_DATE must be an ISO date (YYYY-MM-DD), got {:?}: {}",
                raw_start, e
            ))
        })?;

        let http_timeout_secs = match optional("HTTP_TIMEOUT_SECS") {
            Some(v) => v.parse().map_err(|_| {
                ImportError::Configuration(format!(
                    "HTTP_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    v
                ))
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Config {
            supabase_url: required("PUBLIC_SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            service_role_key: required("SERVICE_ROLE_KEY")?,
            start_date,
            asset_symbol: required("ASSET_SYMBOL")?.to_lowercase(),
            binance_api_url: optional("BINANCE_API_URL")
                .unwrap_or_else(|| DEFAULT_BINANCE_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            database_url: optional("DATABASE_URL"),
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            http_timeout_secs,
        })
    }

    /// Lowercase ticker, used for table and import naming.
    pub fn asset_symbol(&self) -> &str {
        &self.asset_symbol
    }

    /// Uppercase ticker as the market-data API expects it.
    pub fn remote_symbol(&self) -> String {
        self.asset_symbol.to_uppercase()
    }

    pub fn table_name(&self) -> String {
        format!("{}_daily_ohlc", self.asset_symbol)
    }

    pub fn import_type(&self) -> String {
        format!("{}_daily", self.asset_symbol)
    }
}
