//! Telemetry Module
//!
//! Lock-free counters describing analysis traffic. Shared between the
//! client, the session and the gateway `/stats` route.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::models::errors::{AnalysisError, ErrorCode};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AnalysisStats {
    pub submissions: u64,
    pub rejected_inputs: u64,
    pub direct_results: u64,
    pub poll_requests: u64,
    pub resolved: u64,
    pub timeouts: u64,
    pub transport_errors: u64,
    pub protocol_violations: u64,
    pub job_failures: u64,
    /// Submissions abandoned because a newer one replaced them
    pub superseded: u64,
    pub avg_latency_ms: f64,
    pub session_start: u64,
}

impl AnalysisStats {
    /// Export as JSON for API
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Main telemetry collector
#[derive(Debug)]
pub struct TelemetryCollector {
    submissions: AtomicU64,
    rejected_inputs: AtomicU64,
    direct_results: AtomicU64,
    poll_requests: AtomicU64,
    resolved: AtomicU64,
    timeouts: AtomicU64,
    transport_errors: AtomicU64,
    protocol_violations: AtomicU64,
    job_failures: AtomicU64,
    superseded: AtomicU64,
    total_latency_ms: AtomicU64,
    session_start: u64,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            rejected_inputs: AtomicU64::new(0),
            direct_results: AtomicU64::new(0),
            poll_requests: AtomicU64::new(0),
            resolved: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            protocol_violations: AtomicU64::new(0),
            job_failures: AtomicU64::new(0),
            superseded: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            session_start: current_timestamp(),
        }
    }

    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_input(&self) {
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_direct_result(&self) {
        self.direct_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_poll(&self) {
        self.poll_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resolved(&self, latency: Duration) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self, error: &AnalysisError) {
        let counter = match error.code() {
            ErrorCode::AddressInvalid => &self.rejected_inputs,
            ErrorCode::PollTimeout => &self.timeouts,
            ErrorCode::HttpStatus | ErrorCode::NetworkFailed => &self.transport_errors,
            ErrorCode::ProtocolViolation => &self.protocol_violations,
            ErrorCode::JobFailed => &self.job_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> AnalysisStats {
        let resolved = self.resolved.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);
        AnalysisStats {
            submissions: self.submissions.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            direct_results: self.direct_results.load(Ordering::Relaxed),
            poll_requests: self.poll_requests.load(Ordering::Relaxed),
            resolved,
            timeouts: self.timeouts.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            protocol_violations: self.protocol_violations.load(Ordering::Relaxed),
            job_failures: self.job_failures.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            avg_latency_ms: if resolved > 0 {
                total_latency as f64 / resolved as f64
            } else {
                0.0
            },
            session_start: self.session_start,
        }
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
