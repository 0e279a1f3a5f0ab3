//! Address Analysis Client
//!
//! Turns an address into a completed `AnalysisResult`, hiding whether the
//! backend answered right away or handed out a job id that has to be polled.
//!
//! Flow:
//! 1. Pre-seeded address: skip submission, poll with the address as job id
//!    (first poll immediately).
//! 2. Otherwise POST the address. A full result resolves at once; a
//!    `processing` reply with a job id enters the poll loop, waiting one
//!    interval before each poll.
//! 3. Each poll either resolves, keeps waiting (`processing` / `pending`) or
//!    fails. After `max_poll_attempts` polls without a result the client
//!    gives up with `Timeout`; the server-side job is left alone.
//!
//! Non-2xx answers fail immediately and are never retried.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::response::{BackendReply, PollStep};
use crate::models::config::ForensicsConfig;
use crate::models::errors::AnalysisError;
use crate::models::types::{AnalysisJob, AnalysisRequest, AnalysisResult, JobStatus};
use crate::providers::backend::{AnalysisBackend, BackendResponse};
use crate::utils::address::{short_address, validate_address};
use crate::utils::telemetry::TelemetryCollector;

pub struct AnalysisClient<B> {
    backend: B,
    config: Arc<ForensicsConfig>,
    telemetry: Arc<TelemetryCollector>,
}

impl<B: AnalysisBackend> AnalysisClient<B> {
    pub fn new(backend: B, config: ForensicsConfig) -> Self {
        Self::with_telemetry(backend, config, Arc::new(TelemetryCollector::new()))
    }

    pub fn with_telemetry(
        backend: B,
        config: ForensicsConfig,
        telemetry: Arc<TelemetryCollector>,
    ) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            telemetry,
        }
    }

    pub fn config(&self) -> &ForensicsConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Analyze one address, resolving to the completed result or a classified failure
    pub async fn analyze(&self, address: &str) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        let outcome = self.run(address).await;

        match &outcome {
            Ok(result) => {
                self.telemetry.record_resolved(start.elapsed());
                info!(
                    "✅ Analysis of {} resolved in {:?} ({} nodes, {} edges)",
                    short_address(address),
                    start.elapsed(),
                    result.transaction_graph.nodes.len(),
                    result.transaction_graph.edges.len()
                );
            }
            Err(e) => {
                self.telemetry.record_failure(e);
                warn!(code = e.code_str(), "❌ Analysis of {} failed: {}", short_address(address), e);
            }
        }

        outcome
    }

    async fn run(&self, address: &str) -> Result<AnalysisResult, AnalysisError> {
        let address = validate_address(address, self.config.address_length)?;
        self.telemetry.record_submission();

        if self.config.is_cached(address) {
            info!("🗂️ {} is pre-seeded, fetching stored results", short_address(address));
            let job = AnalysisJob::new(address, JobStatus::Pending);
            return self.poll(job, false).await;
        }

        info!("🔍 Submitting {} for analysis", short_address(address));
        let response = self.backend.submit(&AnalysisRequest::new(address)).await?;
        let body = decode(response)?;

        match BackendReply::parse(body.clone())?.into_step(&body)? {
            PollStep::Resolved(result) => {
                self.telemetry.record_direct_result();
                debug!("Backend answered synchronously, no polling needed");
                Ok(result)
            }
            PollStep::Pending {
                job_id: Some(job_id),
                status,
            } => {
                info!("⏳ Job {} accepted ({}), polling for results", job_id, status.as_str());
                self.poll(AnalysisJob::new(job_id, status), true).await
            }
            PollStep::Pending { job_id: None, .. } => Err(AnalysisError::protocol(
                "submission accepted without a job id",
                body,
            )),
        }
    }

    /// Poll the results endpoint until the job resolves or the budget runs out
    async fn poll(&self, mut job: AnalysisJob, wait_first: bool) -> Result<AnalysisResult, AnalysisError> {
        let max_attempts = self.config.max_poll_attempts;

        for attempt in 1..=max_attempts {
            if wait_first || attempt > 1 {
                tokio::time::sleep(self.config.poll_interval).await;
            }

            self.telemetry.record_poll();
            let response = self.backend.fetch_results(&job.job_id).await?;
            let body = decode(response)?;

            match BackendReply::parse(body.clone())?.into_step(&body)? {
                PollStep::Resolved(result) => return Ok(result),
                PollStep::Pending { status, .. } => {
                    job.status = status;
                    debug!(
                        "Job {} still {} (attempt {}/{})",
                        job.job_id,
                        job.status.as_str(),
                        attempt,
                        max_attempts
                    );
                }
            }
        }

        debug!(
            "⌛ Gave up on job {} after {} polls (last status: {})",
            job.job_id,
            max_attempts,
            job.status.as_str()
        );
        Err(AnalysisError::Timeout {
            attempts: max_attempts,
        })
    }
}

/// Check the HTTP status and decode the JSON body
fn decode(response: BackendResponse) -> Result<Value, AnalysisError> {
    if !response.is_success() {
        let body = Some(response.body).filter(|b| !b.is_empty());
        return Err(AnalysisError::transport(response.status, body));
    }
    serde_json::from_str(&response.body).map_err(|_| {
        AnalysisError::protocol("reply is not valid JSON", Value::String(response.body))
    })
}
