use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

use lithium_prices::config::ServiceConfig;
use lithium_prices::history::FileHistoryStore;
use lithium_prices::{HistoryStore, RemoteQuoteSource, SnapshotSource, StaticQuoteSource};

/// Application state shared across handlers
pub struct AppState {
    pub source: Arc<dyn SnapshotSource>,
    pub history: Arc<dyn HistoryStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting Lithium Prices Service...");

    let config = ServiceConfig::load()?;

    let source: Arc<dyn SnapshotSource> = match &config.quote_url {
        Some(url) => {
            info!("✓ Remote quote source: {}", url);
            Arc::new(RemoteQuoteSource::new(
                url.clone(),
                config.quote_timeout_secs,
            ))
        }
        None => {
            info!("✓ Static quote source (hardcoded constants)");
            Arc::new(StaticQuoteSource::new())
        }
    };

    let history: Arc<dyn HistoryStore> =
        Arc::new(FileHistoryStore::new(config.history_path.clone()));
    info!("✓ History store at {}", config.history_path.display());

    // Create app state
    let state = Arc::new(AppState { source, history });

    // Build router
    let app = Router::new()
        .route("/prices", get(handlers::get_prices))
        .route(
            "/prices/save-history",
            axum::routing::post(handlers::save_history),
        )
        .route("/health", get(handlers::health_check))
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!(
        "🚀 Lithium Prices Service listening on port {}",
        config.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}

mod handlers;
