//! Gateway route table

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{logging_middleware, rate_limit_middleware};

/// Build the gateway router.
///
/// `/api/analyze-address` and `/api/get-results` proxy to the analysis
/// backend; `/api/stats` and `/health` are served locally.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/analyze-address", post(handlers::analyze_address))
        .route("/get-results", get(handlers::get_results))
        .route("/stats", get(handlers::get_stats));

    // ServiceBuilder runs top to bottom: logging sees rate limited requests too
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(CompressionLayer::new());

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health_check))
        .with_state(state)
        .layer(layers)
}
