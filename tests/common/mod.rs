//! Shared fixtures: a scripted in-memory backend and sample payloads

#![allow(dead_code)]

use serde_json::{json, Value};
use sol_forensics::models::types::AnalysisRequest;
use sol_forensics::{AnalysisBackend, AnalysisError, BackendResponse};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

/// A 44-character address made of one repeated character
pub fn addr(c: char) -> String {
    std::iter::repeat(c).take(44).collect()
}

/// Full result body whose single edge carries `marker` as its value
pub fn result_body(marker: f64) -> Value {
    json!({
        "tx_graph": {
            "nodes": {
                "Src": {"id": "Src", "label": "Binance Exchange", "amount_usd_received": 0, "amount_usd_sent": 10}
            },
            "edges": [{"from": "Src", "to": "Dst", "value": marker}]
        },
        "wallet_analysis": {
            "activity_patterns": {"wallet_address": "Src", "active_period_days": 3,
                                  "avg_tx_per_day": 1.0, "sender_to_receiver_ratio": 1.0, "sol_net_flow": 0.5},
            "transaction_history": {"first_transaction": "2024-01-01", "last_transaction": "2024-01-03",
                                    "num_transactions": 3, "total_sol_volume_received": 1.0,
                                    "total_sol_volume_sent": 0.5},
            "funding_sources": []
        }
    })
}

pub fn processing(job_id: &str) -> BackendResponse {
    BackendResponse::json(200, &json!({"status": "processing", "job_id": job_id}))
}

pub fn completed(marker: f64) -> BackendResponse {
    BackendResponse::json(200, &json!({"status": "completed", "data": result_body(marker)}))
}

/// Backend answering from per-address and per-job scripts.
///
/// Polls with no scripted reply left answer `{"status": "processing"}`.
#[derive(Default)]
pub struct ScriptedBackend {
    submit_replies: Mutex<HashMap<String, BackendResponse>>,
    poll_replies: Mutex<HashMap<String, VecDeque<BackendResponse>>>,
    submits: Mutex<Vec<String>>,
    polls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit(self, address: &str, reply: BackendResponse) -> Self {
        self.submit_replies
            .lock()
            .unwrap()
            .insert(address.to_string(), reply);
        self
    }

    pub fn on_poll(self, job_id: &str, replies: Vec<BackendResponse>) -> Self {
        self.poll_replies
            .lock()
            .unwrap()
            .insert(job_id.to_string(), replies.into());
        self
    }

    pub fn submits(&self) -> Vec<String> {
        self.submits.lock().unwrap().clone()
    }

    pub fn polls(&self) -> Vec<(String, Instant)> {
        self.polls.lock().unwrap().clone()
    }
}

impl AnalysisBackend for ScriptedBackend {
    async fn submit(&self, request: &AnalysisRequest) -> Result<BackendResponse, AnalysisError> {
        self.submits.lock().unwrap().push(request.address.clone());
        let reply = self.submit_replies.lock().unwrap().get(&request.address).cloned();
        Ok(reply.unwrap_or_else(|| BackendResponse::new(404, "no script")))
    }

    async fn fetch_results(&self, job_id: &str) -> Result<BackendResponse, AnalysisError> {
        self.polls
            .lock()
            .unwrap()
            .push((job_id.to_string(), Instant::now()));
        let reply = self
            .poll_replies
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(|queue| queue.pop_front());
        Ok(reply.unwrap_or_else(|| {
            BackendResponse::json(200, &json!({"status": "processing"}))
        }))
    }
}
