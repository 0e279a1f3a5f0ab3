//! Analysis backend transport
//!
//! The backend exposes two endpoints: job submission (POST JSON `{address}`)
//! and job results (GET `?job_id=`). `AnalysisBackend` is the seam the
//! polling client talks through; `HttpBackend` is the reqwest implementation.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use std::future::Future;
use tracing::{debug, info};

use crate::models::config::ForensicsConfig;
use crate::models::errors::AnalysisError;
use crate::models::types::AnalysisRequest;
use crate::utils::address::short_address;
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

/// Raw backend answer: HTTP status plus undecoded body
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    pub status: u16,
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Build a response from a JSON value
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to the remote analysis service
pub trait AnalysisBackend: Send + Sync {
    /// POST the address to the job submission endpoint
    fn submit(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<BackendResponse, AnalysisError>> + Send;

    /// GET the job status / result for `job_id`
    fn fetch_results(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<BackendResponse, AnalysisError>> + Send;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    analyze_url: String,
    results_url: String,
}

impl HttpBackend {
    pub fn new(config: &ForensicsConfig) -> Result<Self, AnalysisError> {
        let client = Self::build_client(config)?;
        info!("🔌 Analysis backend: {}", config.backend_url);
        Ok(Self {
            client,
            analyze_url: config.analyze_url(),
            results_url: config.results_url(),
        })
    }

    /// Build HTTP client with default headers and gzip decoding
    fn build_client(config: &ForensicsConfig) -> Result<reqwest::Client, AnalysisError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(|e| AnalysisError::network(format!("failed to build HTTP client: {}", e)))
    }

    async fn read(response: reqwest::Response) -> Result<BackendResponse, AnalysisError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(BackendResponse { status, body })
    }
}

impl AnalysisBackend for HttpBackend {
    async fn submit(&self, request: &AnalysisRequest) -> Result<BackendResponse, AnalysisError> {
        debug!("📤 POST {} ({})", self.analyze_url, short_address(&request.address));
        let response = self
            .client
            .post(&self.analyze_url)
            .json(request)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn fetch_results(&self, job_id: &str) -> Result<BackendResponse, AnalysisError> {
        debug!("📥 GET {}?job_id={}", self.results_url, job_id);
        let response = self
            .client
            .get(&self.results_url)
            .query(&[("job_id", job_id)])
            .send()
            .await?;
        Self::read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_response_success_range() {
        assert!(BackendResponse::new(200, "{}").is_success());
        assert!(BackendResponse::new(204, "").is_success());
        assert!(!BackendResponse::new(302, "").is_success());
        assert!(!BackendResponse::new(500, "").is_success());
    }

    #[test]
    fn test_http_backend_urls() {
        let config = ForensicsConfig::default().with_backend_url("http://backend:9000");
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.analyze_url, "http://backend:9000/api/analyze_address");
        assert_eq!(backend.results_url, "http://backend:9000/api/get_results");
    }
}
