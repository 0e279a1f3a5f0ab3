//! Core data types exchanged with the analysis backend
//!
//! Field names mirror the backend JSON. Numeric fields are read leniently:
//! the backend serializes pandas frames, so `null`, integers, floats and
//! numeric strings all show up for the same column.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::utils::constants::UNKNOWN_LABEL;

// ============================================
// Request / Job
// ============================================

/// Body of the job submission endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub address: String,
}

impl AnalysisRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Job state as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Pending,
    Completed,
    Error,
}

impl JobStatus {
    /// Parse a backend status string; unknown values yield `None`
    pub fn from_wire(status: &str) -> Option<Self> {
        match status {
            "processing" => Some(Self::Processing),
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Job still running server-side
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Processing | Self::Pending)
    }
}

/// A server-side job the client is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub job_id: String,
    pub status: JobStatus,
}

impl AnalysisJob {
    pub fn new(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
        }
    }
}

// ============================================
// Result payload
// ============================================

/// Completed analysis: transaction graph plus wallet report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "tx_graph")]
    pub transaction_graph: TransactionGraph,
    pub wallet_analysis: WalletAnalysisReport,
}

/// Directed multigraph of transfers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionGraph {
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeInfo>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl TransactionGraph {
    pub fn node(&self, address: &str) -> Option<&NodeInfo> {
        self.nodes.get(address)
    }

    /// Addresses referenced by edges but missing from the node map
    pub fn dangling_addresses(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = Vec::new();
        for edge in &self.edges {
            for addr in [edge.from.as_str(), edge.to.as_str()] {
                if !self.nodes.contains_key(addr) && !missing.contains(&addr) {
                    missing.push(addr);
                }
            }
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default = "unknown_label", deserialize_with = "de_label")]
    pub label: String,
    #[serde(rename = "amount_usd_received", default, deserialize_with = "de_f64")]
    pub amount_received: f64,
    #[serde(rename = "amount_usd_sent", default, deserialize_with = "de_f64")]
    pub amount_sent: f64,
}

impl NodeInfo {
    pub fn unknown(address: impl Into<String>) -> Self {
        Self {
            id: address.into(),
            label: unknown_label(),
            amount_received: 0.0,
            amount_sent: 0.0,
        }
    }
}

/// Transfer record; duplicates are legitimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, deserialize_with = "de_f64")]
    pub value: f64,
}

// ============================================
// Wallet analysis
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletAnalysisReport {
    #[serde(default)]
    pub activity_patterns: ActivityPatterns,
    #[serde(default)]
    pub transaction_history: TransactionHistory,
    #[serde(default)]
    pub funding_sources: Vec<FundingSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPatterns {
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default, deserialize_with = "de_f64")]
    pub active_period_days: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub avg_tx_per_day: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub sender_to_receiver_ratio: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub sol_net_flow: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionHistory {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub first_transaction: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub last_transaction: Option<String>,
    #[serde(default, deserialize_with = "de_u64")]
    pub num_transactions: u64,
    #[serde(default, deserialize_with = "de_f64")]
    pub total_sol_volume_received: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub total_sol_volume_sent: f64,
}

/// One row of the funding-source table, keyed by counterparty entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingSource {
    #[serde(rename = "Entity Label", default = "unknown_label", deserialize_with = "de_label")]
    pub entity_label: String,
    #[serde(rename = "Unique Senders", default, deserialize_with = "de_u64")]
    pub unique_senders: u64,
    #[serde(rename = "Unique Receivers", default, deserialize_with = "de_u64")]
    pub unique_receivers: u64,
    #[serde(rename = "SOL Received", default, deserialize_with = "de_f64")]
    pub sol_received: f64,
    #[serde(rename = "SOL Sent", default, deserialize_with = "de_f64")]
    pub sol_sent: f64,
    #[serde(rename = "Token Received (Total)", default, deserialize_with = "de_tokens")]
    pub tokens_received: TokenTotals,
    #[serde(rename = "Token Sent (Total)", default, deserialize_with = "de_tokens")]
    pub tokens_sent: TokenTotals,
}

/// Per-token amounts (`{"token_amount": {"USDC": 12.5}}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenTotals {
    #[serde(default)]
    pub token_amount: BTreeMap<String, f64>,
}

// ============================================
// Lenient deserializers
// ============================================

fn unknown_label() -> String {
    UNKNOWN_LABEL.to_string()
}

fn value_to_f64(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        serde_json::Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn de_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    let n = value_to_f64(&value);
    Ok(if n.is_finite() { n } else { 0.0 })
}

fn de_u64<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .unwrap_or_else(|| n.as_f64().map(|f| f.max(0.0) as u64).unwrap_or(0)),
        other => value_to_f64(other).max(0.0) as u64,
    })
}

fn de_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn de_label<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let label = de_opt_string(de)?;
    Ok(label
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(unknown_label))
}

fn de_tokens<'de, D: Deserializer<'de>>(de: D) -> Result<TokenTotals, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    let mut totals = TokenTotals::default();
    if let Some(amounts) = value.get("token_amount").and_then(|v| v.as_object()) {
        for (token, amount) in amounts {
            totals.token_amount.insert(token.clone(), value_to_f64(amount));
        }
    }
    Ok(totals)
}
