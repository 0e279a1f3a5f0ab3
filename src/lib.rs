//! Sol Forensics Library
//!
//! Client side of a Solana forensic analysis service:
//! - Submits an address and polls the analysis job until it completes
//! - Keeps one live result per session, dropping superseded outcomes
//! - Projects the transaction graph and wallet report for display
//! - Serves a small gateway in front of the analysis backend

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    AnalysisClient, BackendReply, GraphView, LabelCategory, PollStep, Route, Session,
    SessionState, SessionView, Ticket, WalletSummary,
};
pub use models::{AnalysisError, AnalysisResult, ForensicsConfig, JobStatus};
pub use providers::{AnalysisBackend, BackendResponse, HttpBackend};
pub use utils::telemetry::{AnalysisStats, TelemetryCollector};
