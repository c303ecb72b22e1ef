use std::sync::Arc;

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use shared::{
    get_db_connection, BinanceClient, CandleSink, Config, Importer, SeaOrmSink, SupabaseClient,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;

use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting OHLC importer...");

    let config = Arc::new(Config::from_env()?);
    info!(
        symbol = %config.remote_symbol(),
        start_date = %config.start_date,
        table = %config.table_name(),
        "Configuration loaded"
    );

    let source = Arc::new(BinanceClient::new(&config.binance_api_url, config.http_timeout_secs)?);
    let sink = build_sink(&config).await?;

    let state = Arc::new(AppState::new(Importer::new(config.clone(), source, sink)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Importer listening on http://{}", config.bind_addr);

    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}

/// Straight to Postgres when `DATABASE_URL` is set, otherwise through the
/// Supabase REST API.
async fn build_sink(config: &Config) -> Result<Arc<dyn CandleSink>> {
    match &config.database_url {
        Some(database_url) => {
            let db = get_db_connection(database_url).await?;
            Migrator::up(&db, None).await?;
            info!("Migrations applied");

            let sink = SeaOrmSink::new(db);
            sink.ensure_candle_table(&config.table_name()).await?;
            Ok(Arc::new(sink))
        }
        None => {
            info!("Persisting through Supabase REST at {}", config.supabase_url);
            let sink = SupabaseClient::new(
                &config.supabase_url,
                &config.service_role_key,
                config.http_timeout_secs,
            )?;
            Ok(Arc::new(sink))
        }
    }
}
