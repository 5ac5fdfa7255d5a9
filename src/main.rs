use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod encoder;
mod engine;
mod error;
mod model;
mod schema;
mod types;

use config::Config;
use engine::ScreeningEngine;
use error::AppError;
use types::{ScreenRequest, ScreenResponse, SELECT_PROMPT};

type AppState = Arc<ScreeningEngine>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ckd_engine=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    info!("Loaded configuration: {:?}", config);

    // Load model artifacts; any failure here halts the process
    let engine = ScreeningEngine::new(&config).await?;
    let app_state = Arc::new(engine);

    // Initialize metrics exporter
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install()
        .expect("Failed to install Prometheus exporter");

    // Build router
    let app = Router::new()
        .route("/screen", post(screen_handler))
        .route("/schema", get(schema_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    info!("Starting CKD screening engine on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn screen_handler(
    State(engine): State<AppState>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<ScreenResponse>, AppError> {
    let start = Instant::now();

    metrics::increment_counter!("screenings_total");

    let result = engine.screen(request)?;

    let latency = start.elapsed().as_millis() as f64;
    metrics::histogram!("screening_duration_ms", latency);

    Ok(Json(result))
}

/// Ordered feature definitions so a client can render one control per
/// feature, selects seeded with the placeholder option.
async fn schema_handler(State(engine): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "placeholder": SELECT_PROMPT,
        "features": engine.schema().features(),
    }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown signal received, starting graceful shutdown");
}
