//! Direct Postgres persistence through SeaORM, used when `DATABASE_URL` is set.

use anyhow::Result;
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, ColumnDef, Expr, OnConflict, Query, SimpleExpr, Table};
use sea_orm::{ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, EntityTrait};
use tracing::{debug, info};

use crate::entity::import_logs;
use crate::error::ImportError;
use crate::models::{Candle, ImportRun};
use crate::sink::{CandleSink, TIME_COLUMN};

const PRICE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

pub async fn get_db_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database via Sea-ORM");
    let db = Database::connect(database_url).await?;
    Ok(db)
}

#[derive(Debug)]
pub struct SeaOrmSink {
    db: DatabaseConnection,
}

impl SeaOrmSink {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// `CREATE TABLE IF NOT EXISTS` for a per-asset candle table.
    pub async fn ensure_candle_table(&self, table: &str) -> crate::Result<()> {
        let mut create = Table::create();
        create
            .table(Alias::new(table))
            .if_not_exists()
            .col(
                ColumnDef::new(Alias::new(TIME_COLUMN))
                    .timestamp_with_time_zone()
                    .not_null()
                    .primary_key(),
            );
        for column in PRICE_COLUMNS {
            create.col(ColumnDef::new(Alias::new(column)).decimal().not_null());
        }

        let backend = self.db.get_database_backend();
        self.db.execute(backend.build(&create)).await?;
        info!(table, "Candle table ready");
        Ok(())
    }
}

// Values go over the wire as text and are cast in SQL, so decimal strings
// never pass through a float.
fn cast_text(value: &str, sql_type: &str) -> SimpleExpr {
    Expr::val(value).cast_as(Alias::new(sql_type))
}

#[async_trait]
impl CandleSink for SeaOrmSink {
    async fn upsert_candles(&self, table: &str, candles: &[Candle]) -> crate::Result<u64> {
        if candles.is_empty() {
            return Ok(0);
        }

        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(table))
            .columns(std::iter::once(TIME_COLUMN).chain(PRICE_COLUMNS).map(Alias::new));

        for candle in candles {
            insert
                .values([
                    cast_text(&candle.time, "timestamptz"),
                    cast_text(&candle.open, "numeric"),
                    cast_text(&candle.high, "numeric"),
                    cast_text(&candle.low, "numeric"),
                    cast_text(&candle.close, "numeric"),
                    cast_text(&candle.volume, "numeric"),
                ])
                .map_err(|e| ImportError::Persistence(e.to_string()))?;
        }

        insert.on_conflict(
            OnConflict::column(Alias::new(TIME_COLUMN))
                .update_columns(PRICE_COLUMNS.map(Alias::new))
                .to_owned(),
        );

        let backend = self.db.get_database_backend();
        let result = self.db.execute(backend.build(&insert)).await?;
        debug!(table, rows = result.rows_affected(), "Upserted candles");

        Ok(result.rows_affected())
    }

    async fn insert_import_log(&self, run: &ImportRun) -> crate::Result<()> {
        let log = import_logs::ActiveModel {
            import_type: Set(run.import_type.clone()),
            start_date: Set(run.start_date),
            end_date: Set(run.end_date),
            batches: Set(run.batches as i32),
            candles_fetched: Set(run.candles_fetched as i64),
            candles_inserted: Set(run.candles_inserted as i64),
            candles_skipped: Set(run.candles_skipped as i64),
            ..Default::default()
        };

        import_logs::Entity::insert(log)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
