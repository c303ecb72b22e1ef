use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use shared::{ImportError, Importer};
use tower_http::trace::TraceLayer;
use tracing::error;

pub struct AppState {
    pub importer: Importer,
    /// Wall-clock date the import window ends relative to.
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(importer: Importer) -> Self {
        Self {
            importer,
            today: utc_today,
        }
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Every request other than `/health` starts one import run; method, path
/// and body are ignored.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", any(health_check))
        .fallback(run_import)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn run_import(State(state): State<Arc<AppState>>) -> Response {
    match state.importer.run((state.today)()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!("Import run failed: {}", e);
            failure_response(&e)
        }
    }
}

/// Callers only get a short diagnostic, details stay in the logs.
fn failure_response(err: &ImportError) -> Response {
    let body = match err {
        ImportError::Fetch(_) => "Error fetching data from Binance",
        ImportError::Persistence(_) => "Database insert error",
        ImportError::MalformedCandle(_) | ImportError::Configuration(_) => "Internal Server Error",
    };
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
