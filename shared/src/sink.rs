use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Candle, ImportRun};

pub const IMPORT_LOGS_TABLE: &str = "import_logs";
/// Conflict target for candle upserts.
pub const TIME_COLUMN: &str = "time";

/// Where candles and run logs end up.
#[async_trait]
pub trait CandleSink: Send + Sync {
    /// Insert-or-overwrite keyed on `time`. Returns the number of rows sent.
    async fn upsert_candles(&self, table: &str, candles: &[Candle]) -> Result<u64>;

    async fn insert_import_log(&self, run: &ImportRun) -> Result<()>;
}
