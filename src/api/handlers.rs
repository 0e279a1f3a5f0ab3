//! API Request Handlers
//!
//! The two proxy routes forward to the analysis backend. Results that come
//! back as a bare `{tx_graph, wallet_analysis}` body are normalized into
//! `{status: "completed", data}` so browsers only see the envelope shape.

use axum::{
    extract::{rejection::JsonRejection, Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::types::*;
use crate::models::config::ForensicsConfig;
use crate::models::errors::AnalysisError;
use crate::models::types::AnalysisRequest;
use crate::providers::backend::{AnalysisBackend, BackendResponse, HttpBackend};
use crate::utils::address::short_address;
use crate::utils::constants::APP_VERSION;
use crate::utils::telemetry::TelemetryCollector;

/// Shared application state
pub struct AppState {
    pub backend: HttpBackend,
    pub backend_url: String,
    pub telemetry: Arc<TelemetryCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: &ForensicsConfig, telemetry: Arc<TelemetryCollector>) -> Result<Self, AnalysisError> {
        Ok(Self {
            backend: HttpBackend::new(config)?,
            backend_url: config.backend_url.clone(),
            telemetry,
            start_time: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

fn proxy_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ProxyError::new(message))).into_response()
}

/// Decode a successful backend body or map the failure to a proxy response
fn forward_body(
    outcome: Result<BackendResponse, AnalysisError>,
    label: &str,
) -> Result<Value, Response> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            error!("{} request failed: {}", label, e);
            return Err(proxy_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !response.is_success() {
        warn!(
            "{} error! status: {}, response: {}",
            label, response.status, response.body
        );
        let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(proxy_error(
            status,
            format!("{} error! status: {}", label, response.status),
        ));
    }

    serde_json::from_str(&response.body).map_err(|_| {
        warn!("{} returned a non-JSON body", label);
        proxy_error(StatusCode::BAD_GATEWAY, format!("{} returned invalid JSON", label))
    })
}

fn is_bare_result(body: &Value) -> bool {
    body.get("tx_graph").is_some_and(|v| !v.is_null())
        && body.get("wallet_analysis").is_some_and(|v| !v.is_null())
}

// ============================================
// Proxy routes
// ============================================

pub async fn analyze_address(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeAddressBody>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected analyze body: {}", rejection.body_text());
            return proxy_error(rejection.status(), rejection.body_text());
        }
    };
    let Some(address) = req.address.filter(|a| !a.trim().is_empty()) else {
        return proxy_error(StatusCode::BAD_REQUEST, "Must Pass Address");
    };

    info!("🔍 Forwarding analysis of {}", short_address(&address));
    state.telemetry.record_submission();

    let outcome = state.backend.submit(&AnalysisRequest::new(address.as_str())).await;
    match forward_body(outcome, "HTTP") {
        Ok(body) => {
            if is_bare_result(&body) {
                state.telemetry.record_direct_result();
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(response) => response,
    }
}

pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResultsQuery>,
) -> Response {
    let Some(job_id) = query.job_id.filter(|j| !j.is_empty()) else {
        return proxy_error(StatusCode::BAD_REQUEST, "Missing job_id parameter");
    };

    state.telemetry.record_poll();
    let outcome = state.backend.fetch_results(&job_id).await;
    match forward_body(outcome, "Get results") {
        Ok(body) if is_bare_result(&body) => (
            StatusCode::OK,
            Json(json!({ "status": "completed", "data": body })),
        )
            .into_response(),
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(response) => response,
    }
}

// ============================================
// Health / Stats
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success(HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        backend_url: state.backend_url.clone(),
    }))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    Json(ApiResponse::success(StatsData {
        stats: state.telemetry.get_stats(),
        uptime_seconds: state.uptime_seconds(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_result_detection() {
        assert!(is_bare_result(&json!({"tx_graph": {}, "wallet_analysis": {}})));
        assert!(!is_bare_result(&json!({"tx_graph": {}, "wallet_analysis": null})));
        assert!(!is_bare_result(&json!({"status": "processing"})));
    }

    #[test]
    fn test_forward_body_maps_status() {
        let response = forward_body(Ok(BackendResponse::new(503, "down")), "HTTP").unwrap_err();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = forward_body(Ok(BackendResponse::new(200, "not json")), "HTTP").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = forward_body(Ok(BackendResponse::new(200, r#"{"a":1}"#)), "HTTP").unwrap();
        assert_eq!(body["a"], 1);
    }
}
