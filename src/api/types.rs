//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::utils::telemetry::AnalysisStats;

/// Response wrapper for the gateway's own routes
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Error body of the proxy routes (`{"error": "..."}`)
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProxyError {
    pub error: String,
}

impl ProxyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Query of `GET /api/get-results`
#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub job_id: Option<String>,
}

/// Body of `POST /api/analyze-address`
#[derive(Debug, Deserialize)]
pub struct AnalyzeAddressBody {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub backend_url: String,
}

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub stats: AnalysisStats,
    pub uptime_seconds: u64,
}
