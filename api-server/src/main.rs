//! Churn Prediction API Server
//!
//! HTTP front for the churn inference engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CHURN PREDICTION API                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────────┐  ┌─────────────────┐  │
//! │  │  Router   │─▶│  Feature Pipeline │─▶│ Inference Engine│  │
//! │  │  (Axum)   │  │  (scale + one-hot)│  │  (classifier)   │  │
//! │  └───────────┘  └─────────┬─────────┘  └────────┬────────┘  │
//! │                           └──────────┬──────────┘           │
//! │                                      ▼                      │
//! │                            ┌───────────────────┐            │
//! │                            │  Artifact Store   │            │
//! │                            │  (load once)      │            │
//! │                            └───────────────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logging;
mod models;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use churn_core::InferenceEngine;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use config::Config;
pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let _log_guard = logging::init_tracing(&config);

    tracing::info!("Churn Prediction API starting ({})...", config.environment);
    tracing::info!("Models directory: {}", config.core.models_dir.display());
    if let Some(dir) = &config.log_dir {
        tracing::info!("Log files: {}", dir.display());
    }

    let engine = Arc::new(InferenceEngine::from_config(&config.core));

    if config.eager_load {
        let layout = engine
            .store()
            .preload()
            .context("failed to load model artifacts")?;
        tracing::info!(
            "Artifacts loaded: {} features ({} numeric, {} one-hot), layout hash {:08x}",
            layout.feature_count,
            layout.numeric_count,
            layout.one_hot_count,
            layout.hash
        );
    } else if config.is_production() {
        tracing::warn!("EAGER_LOAD disabled in production - first request pays the artifact load");
    }

    // Build application state
    let state = AppState {
        engine,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub config: Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::single))
        .route("/predict/batch", post(handlers::predict::batch))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        .with_state(state)
}
