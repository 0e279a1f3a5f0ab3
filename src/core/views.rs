//! Read-only projections of an `AnalysisResult`
//!
//! Pages render from these instead of walking the raw payload. Nothing here
//! mutates the result, and edges pointing at addresses missing from the node
//! map degrade to an "Unknown" node instead of failing.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;

use crate::models::types::{AnalysisResult, Edge, NodeInfo, TransactionGraph, WalletAnalysisReport};
use crate::utils::constants::{NATIVE_SYMBOL, UNKNOWN_ADDRESS_LABEL, UNKNOWN_LABEL};

/// Coarse entity class used for coloring labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelCategory {
    Exchange,
    DeFi,
    Unknown,
    Other,
}

impl LabelCategory {
    pub fn of(label: &str) -> Self {
        if label.contains("Exchange") {
            Self::Exchange
        } else if label.contains("DeFi") {
            Self::DeFi
        } else if label.contains(UNKNOWN_LABEL) {
            Self::Unknown
        } else {
            Self::Other
        }
    }

    /// Display color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            Self::Exchange => "#FFD700",
            Self::DeFi => "#32CD32",
            Self::Unknown => "#A9A9A9",
            Self::Other => "#1E90FF",
        }
    }
}

pub fn is_unknown_label(label: &str) -> bool {
    let label = label.trim();
    label.is_empty() || label == UNKNOWN_LABEL || label == UNKNOWN_ADDRESS_LABEL
}

/// One row of the entity label listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityLabelRow {
    pub address: String,
    pub label: String,
    pub category: LabelCategory,
}

/// Graph projection used by the flow and label pages
pub struct GraphView<'a> {
    graph: &'a TransactionGraph,
}

impl<'a> GraphView<'a> {
    pub fn new(graph: &'a TransactionGraph) -> Self {
        Self { graph }
    }

    pub fn of(result: &'a AnalysisResult) -> Self {
        Self::new(&result.transaction_graph)
    }

    /// Node info, synthesizing an unknown node for addresses only edges mention
    pub fn node(&self, address: &str) -> Cow<'a, NodeInfo> {
        match self.graph.nodes.get(address) {
            Some(node) => Cow::Borrowed(node),
            None => Cow::Owned(NodeInfo::unknown(address)),
        }
    }

    pub fn label_for(&self, address: &str) -> &'a str {
        self.graph
            .nodes
            .get(address)
            .map(|n| n.label.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Edges with `address` at either end, in payload order
    pub fn edges_touching(&self, address: &str) -> Vec<&'a Edge> {
        self.graph
            .edges
            .iter()
            .filter(|e| e.from == address || e.to == address)
            .collect()
    }

    /// Every address in the graph: node map first, then edge-only addresses
    pub fn addresses(&self) -> Vec<&'a str> {
        let mut out: Vec<&'a str> = self.graph.nodes.keys().map(String::as_str).collect();
        out.extend(self.graph.dangling_addresses());
        out
    }

    pub fn entity_labels(&self) -> Vec<EntityLabelRow> {
        self.addresses()
            .into_iter()
            .map(|address| {
                let label = self.label_for(address).to_string();
                EntityLabelRow {
                    address: address.to_string(),
                    category: LabelCategory::of(&label),
                    label,
                }
            })
            .collect()
    }

    /// Distinct attributed labels (protocols, exchanges...) in first-seen order
    pub fn protocols(&self) -> Vec<&'a str> {
        let mut seen: Vec<&'a str> = Vec::new();
        for node in self.graph.nodes.values() {
            let label = node.label.as_str();
            if !is_unknown_label(label) && !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen
    }

    /// Address with the most edges; ties go to the first one seen in edge order
    pub fn focal_address(&self) -> Option<&'a str> {
        let mut degree: HashMap<&'a str, (usize, usize)> = HashMap::new();
        let mut order = 0usize;
        for edge in &self.graph.edges {
            for addr in [edge.from.as_str(), edge.to.as_str()] {
                let entry = degree.entry(addr).or_insert_with(|| {
                    order += 1;
                    (0, order)
                });
                entry.0 += 1;
            }
        }
        degree
            .into_iter()
            .max_by(|(_, (da, oa)), (_, (db, ob))| da.cmp(db).then(ob.cmp(oa)))
            .map(|(addr, _)| addr)
    }

    /// Sum of edge values into and out of `address`
    pub fn flow_totals(&self, address: &str) -> (f64, f64) {
        self.graph.edges.iter().fold((0.0, 0.0), |(inflow, outflow), e| {
            let inflow = if e.to == address { inflow + e.value } else { inflow };
            let outflow = if e.from == address { outflow + e.value } else { outflow };
            (inflow, outflow)
        })
    }
}

/// Wallet analysis formatted the way the summary panels print it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSummary {
    pub wallet_address: String,
    pub active_period_days: String,
    pub avg_tx_per_day: String,
    pub sender_to_receiver_ratio: String,
    pub net_flow: String,
    pub first_transaction: String,
    pub last_transaction: String,
    pub num_transactions: u64,
    pub total_received: String,
    pub total_sent: String,
    pub funding: Vec<FundingRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingRow {
    pub entity_label: String,
    pub unique_senders: u64,
    pub unique_receivers: u64,
    pub received: String,
    pub sent: String,
    pub tokens_received: Vec<(String, String)>,
    pub tokens_sent: Vec<(String, String)>,
}

impl WalletSummary {
    pub fn from_report(report: &WalletAnalysisReport) -> Self {
        let activity = &report.activity_patterns;
        let history = &report.transaction_history;
        let sol = |v: f64| format!("{:.4} {}", v, NATIVE_SYMBOL);
        let tokens = |m: &std::collections::BTreeMap<String, f64>| {
            m.iter()
                .map(|(token, amount)| (token.clone(), format!("{:.2}", amount)))
                .collect::<Vec<_>>()
        };

        Self {
            wallet_address: activity.wallet_address.clone(),
            active_period_days: format!("{} days", activity.active_period_days),
            avg_tx_per_day: format!("{:.2}", activity.avg_tx_per_day),
            sender_to_receiver_ratio: format!("{:.2}", activity.sender_to_receiver_ratio),
            net_flow: sol(activity.sol_net_flow),
            first_transaction: history.first_transaction.clone().unwrap_or_else(|| "-".into()),
            last_transaction: history.last_transaction.clone().unwrap_or_else(|| "-".into()),
            num_transactions: history.num_transactions,
            total_received: sol(history.total_sol_volume_received),
            total_sent: sol(history.total_sol_volume_sent),
            funding: report
                .funding_sources
                .iter()
                .map(|f| FundingRow {
                    entity_label: f.entity_label.clone(),
                    unique_senders: f.unique_senders,
                    unique_receivers: f.unique_receivers,
                    received: sol(f.sol_received),
                    sent: sol(f.sol_sent),
                    tokens_received: tokens(&f.tokens_received.token_amount),
                    tokens_sent: tokens(&f.tokens_sent.token_amount),
                })
                .collect(),
        }
    }
}
