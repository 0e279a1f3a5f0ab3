//! Sol Forensics Analysis Gateway
//!
//! Proxies browser requests to the analysis backend.
//!
//! Usage:
//!   cargo run --bin forensics_gateway
//!
//! Environment:
//!   PORT / FORENSICS_PORT  - Server port (default: 8080)
//!   FORENSICS_HOST         - Server host (default: 0.0.0.0)
//!   FORENSICS_BACKEND_URL  - Analysis backend base URL
//!   RUST_LOG               - Log filter (default: info)

use sol_forensics::api::{create_router, handlers::AppState, start_cleanup_task};
use sol_forensics::utils::constants::{APP_NAME, APP_VERSION};
use sol_forensics::{ForensicsConfig, TelemetryCollector};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = ForensicsConfig::from_env()?;
    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::new(&config, telemetry)?);

    start_cleanup_task();

    let app = create_router(state);

    let host = std::env::var("FORENSICS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("FORENSICS_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 {} gateway v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  POST /api/analyze-address  - Submit an address for analysis");
    info!("  GET  /api/get-results      - Poll a job (?job_id=...)");
    info!("  GET  /api/stats            - Traffic statistics");
    info!("  GET  /health               - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received");
    info!("{}", telemetry_for_shutdown.get_stats().to_json());

    Ok(())
}
