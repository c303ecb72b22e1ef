pub mod binance;
pub mod chunker;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod importer;
pub mod models;
pub mod sink;
pub mod supabase;

pub use binance::{BinanceClient, CandleSource};
pub use chunker::{Batch, DateChunks};
pub use config::Config;
pub use database::{get_db_connection, SeaOrmSink};
pub use error::{ImportError, Result};
pub use importer::Importer;
pub use models::*;
pub use sink::CandleSink;
pub use supabase::SupabaseClient;
