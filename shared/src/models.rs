use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ImportError, Result};

/// One daily candle as it is stored.
///
/// Prices and volume stay decimal strings end to end so nothing is lost
/// to float rounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub time: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl Candle {
    /// Maps one kline row (`[open_time_ms, open, high, low, close, volume, ...]`).
    pub fn from_kline_row(row: &Value) -> Result<Self> {
        let fields = row
            .as_array()
            .ok_or_else(|| ImportError::MalformedCandle(format!("expected an array, got {}", row)))?;

        if fields.len() < 6 {
            return Err(ImportError::MalformedCandle(format!(
                "expected at least 6 fields, got {}",
                fields.len()
            )));
        }

        let open_time = fields[0].as_i64().ok_or_else(|| {
            ImportError::MalformedCandle(format!("open time is not an integer: {}", fields[0]))
        })?;

        Ok(Candle {
            time: millis_to_iso(open_time)?,
            open: decimal_text(&fields[1]),
            high: decimal_text(&fields[2]),
            low: decimal_text(&fields[3]),
            close: decimal_text(&fields[4]),
            volume: decimal_text(&fields[5]),
        })
    }
}

/// `2023-11-14T22:13:20.000Z`
pub fn millis_to_iso(millis: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| ImportError::MalformedCandle(format!("open time out of range: {}", millis)))
}

// Strings are taken verbatim, numbers keep their original digits.
fn decimal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The audit record written once per successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRun {
    pub import_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub batches: u32,
    pub candles_fetched: u64,
    pub candles_inserted: u64,
    pub candles_skipped: u64,
}

/// Body of the 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub status: String,
    pub import_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub batches: u32,
    pub candles_fetched: u64,
    pub candles_inserted: u64,
    pub candles_skipped: u64,
}

impl ImportSummary {
    pub fn new(remote_symbol: &str, run: ImportRun) -> Self {
        Self {
            status: format!("✅ {} candles import complete", remote_symbol),
            import_type: run.import_type,
            start_date: run.start_date,
            end_date: run.end_date,
            batches: run.batches,
            candles_fetched: run.candles_fetched,
            candles_inserted: run.candles_inserted,
            candles_skipped: run.candles_skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_kline_row() {
        let row = json!([1700000000000i64, "100.5", "105.2", "99.1", "103.4", "1234.56"]);
        let candle = Candle::from_kline_row(&row).unwrap();

        assert_eq!(candle.time, "2023-11-14T22:13:20.000Z");
        assert_eq!(candle.open, "100.5");
        assert_eq!(candle.high, "105.2");
        assert_eq!(candle.low, "99.1");
        assert_eq!(candle.close, "103.4");
        assert_eq!(candle.volume, "1234.56");
    }

    #[test]
    fn test_full_binance_row_ignores_trailing_fields() {
        let row: Value = serde_json::from_str(
            r#"[1502928000000,"4261.48000000","4485.39000000","4200.74000000","4285.08000000","795.15037700",1503014399999,"3454770.05073206",3427,"616.24854100","2678216.40060401","0"]"#,
        )
        .unwrap();
        let candle = Candle::from_kline_row(&row).unwrap();

        assert_eq!(candle.time, "2017-08-17T00:00:00.000Z");
        assert_eq!(candle.open, "4261.48000000");
        assert_eq!(candle.volume, "795.15037700");
    }

    #[test]
    fn test_numeric_prices_keep_their_digits() {
        let row: Value =
            serde_json::from_str("[1700000000000, 0.1000000000000000055511, 2, 1.5, 1e3, 12345678901234567890.123]")
                .unwrap();
        let candle = Candle::from_kline_row(&row).unwrap();

        assert_eq!(candle.open, "0.1000000000000000055511");
        assert_eq!(candle.high, "2");
        assert_eq!(candle.volume, "12345678901234567890.123");
    }

    #[test]
    fn test_non_array_row_is_malformed() {
        let err = Candle::from_kline_row(&json!({"open": "1"})).unwrap_err();
        assert!(matches!(err, ImportError::MalformedCandle(_)));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let err = Candle::from_kline_row(&json!([1700000000000i64, "1", "2"])).unwrap_err();
        assert!(matches!(err, ImportError::MalformedCandle(_)));
    }

    #[test]
    fn test_non_integer_open_time_is_malformed() {
        let row = json!(["yesterday", "1", "2", "3", "4", "5"]);
        assert!(matches!(
            Candle::from_kline_row(&row),
            Err(ImportError::MalformedCandle(_))
        ));
    }

    #[test]
    fn test_summary_serializes_iso_dates() {
        let run = ImportRun {
            import_type: "btcusdt_daily".to_string(),
            start_date: NaiveDate::from_ymd_opt(2017, 8, 17).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2017, 8, 20).unwrap(),
            batches: 1,
            candles_fetched: 4,
            candles_inserted: 4,
            candles_skipped: 0,
        };
        let body = serde_json::to_value(ImportSummary::new("BTCUSDT", run)).unwrap();

        assert_eq!(body["status"], "✅ BTCUSDT candles import complete");
        assert_eq!(body["start_date"], "2017-08-17");
        assert_eq!(body["end_date"], "2017-08-20");
        assert_eq!(body["batches"], 1);
        assert_eq!(body["candles_inserted"], 4);
        assert_eq!(body["candles_skipped"], 0);
    }
}
