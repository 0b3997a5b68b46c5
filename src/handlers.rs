use axum::{extract::State, http::StatusCode, Json};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;
use lithium_prices::{contracts, engine, DerivedPrices, HistorySnapshot, PricesError};

/// GET /prices - the fully derived price record for the dashboard
pub async fn get_prices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DerivedPrices>, (StatusCode, String)> {
    let mut snapshot = state.source.fetch().await.map_err(reject)?;
    engine::validate_snapshot(&snapshot).map_err(reject)?;

    let history = state.history.load().await.map_err(reject)?;

    let now = Utc::now();
    snapshot.futures = contracts::filter_active(snapshot.futures, now.date_naive());

    let derived = engine::build_response(&snapshot, history.as_ref(), now);

    info!(
        "Serving {} futures from {} (baseline: {:?})",
        derived.futures.len(),
        state.source.name(),
        derived.history_date
    );

    Ok(Json(derived))
}

/// POST /prices/save-history - snapshot current prices as tomorrow's baseline
pub async fn save_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SaveHistoryResponse>, (StatusCode, String)> {
    let snapshot = state.source.fetch().await.map_err(reject)?;
    engine::validate_snapshot(&snapshot).map_err(reject)?;

    let date = Utc::now().date_naive();
    let record = HistorySnapshot::from_snapshot(&snapshot, date);
    state.history.save(&record).await.map_err(reject)?;

    info!("Saved history baseline for {}", date);

    Ok(Json(SaveHistoryResponse { saved: true, date }))
}

/// GET /health - Service health check
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.source.name().to_string(),
    })
}

fn reject(e: PricesError) -> (StatusCode, String) {
    warn!("Request failed: {}", e);
    let status = match e {
        PricesError::SourceError(_) => StatusCode::SERVICE_UNAVAILABLE,
        PricesError::InvalidResponse(_) | PricesError::InvalidQuote(_) => StatusCode::BAD_GATEWAY,
        PricesError::HistoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

// Response types
#[derive(Debug, serde::Serialize)]
pub struct SaveHistoryResponse {
    pub saved: bool,
    pub date: NaiveDate,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source: String,
}
