//! Backend reply parser
//!
//! Both backend endpoints answer in several shapes: the full result at the
//! top level, a `{status, job_id}` envelope, an envelope with the result
//! nested under `data`, or an `{error}` body. This is the one place those
//! shapes are told apart.

use serde_json::Value;
use tracing::warn;

use crate::models::errors::AnalysisError;
use crate::models::types::{AnalysisResult, JobStatus};

const TX_GRAPH_KEY: &str = "tx_graph";
const WALLET_ANALYSIS_KEY: &str = "wallet_analysis";

/// A parsed backend reply
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    /// Result fields at the top level, with or without a status field
    Direct(AnalysisResult),
    /// `{status, job_id?, data?}` envelope with a known status
    StatusWrapped {
        status: JobStatus,
        job_id: Option<String>,
        data: Option<AnalysisResult>,
    },
    /// `{error: "..."}` body
    Error { message: String },
}

/// What the polling state machine should do next
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    Resolved(AnalysisResult),
    Pending {
        job_id: Option<String>,
        status: JobStatus,
    },
}

impl BackendReply {
    /// Classify a raw JSON body.
    ///
    /// A body carrying both result fields wins over whatever `status` says.
    pub fn parse(body: Value) -> Result<Self, AnalysisError> {
        if !body.is_object() {
            return Err(AnalysisError::protocol("reply is not a JSON object", body));
        }

        if has_result_fields(&body) {
            if body.get("status").is_some() {
                warn!("⚠️ Reply carries a status and a full result; treating the result as authoritative");
            }
            return parse_result(&body)
                .map(BackendReply::Direct)
                .map_err(|reason| AnalysisError::protocol(reason, body));
        }

        match body.get("status") {
            Some(Value::String(raw)) => {
                let Some(status) = JobStatus::from_wire(raw) else {
                    return Err(AnalysisError::protocol(
                        format!("unrecognized job status {:?}", raw),
                        body,
                    ));
                };
                let job_id = body.get("job_id").and_then(job_id_string);
                let data = match body.get("data") {
                    Some(data) if has_result_fields(data) => Some(
                        parse_result(data)
                            .map_err(|reason| AnalysisError::protocol(reason, body.clone()))?,
                    ),
                    _ => None,
                };
                Ok(BackendReply::StatusWrapped {
                    status,
                    job_id,
                    data,
                })
            }
            Some(_) => Err(AnalysisError::protocol("job status is not a string", body)),
            None => match body.get("error") {
                Some(error) => Ok(BackendReply::Error {
                    message: error
                        .as_str()
                        .map(String::from)
                        .unwrap_or_else(|| error.to_string()),
                }),
                None => Err(AnalysisError::protocol("reply has neither result nor status", body)),
            },
        }
    }

    /// Reduce the reply to the next polling step.
    ///
    /// `raw` is the original body, attached to protocol violations.
    pub fn into_step(self, raw: &Value) -> Result<PollStep, AnalysisError> {
        match self {
            BackendReply::Direct(result) => Ok(PollStep::Resolved(result)),
            BackendReply::StatusWrapped {
                status: JobStatus::Completed,
                data: Some(result),
                ..
            } => Ok(PollStep::Resolved(result)),
            BackendReply::StatusWrapped {
                status: JobStatus::Completed,
                data: None,
                ..
            } => Err(AnalysisError::protocol(
                "completed job without result data",
                raw.clone(),
            )),
            BackendReply::StatusWrapped {
                status: status @ (JobStatus::Processing | JobStatus::Pending),
                job_id,
                ..
            } => Ok(PollStep::Pending { job_id, status }),
            BackendReply::StatusWrapped {
                status: JobStatus::Error,
                ..
            } => Err(AnalysisError::JobFailed {
                message: raw
                    .get("error")
                    .or_else(|| raw.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("backend reported job error")
                    .to_string(),
            }),
            BackendReply::Error { message } => Err(AnalysisError::JobFailed { message }),
        }
    }
}

fn has_result_fields(value: &Value) -> bool {
    value.get(TX_GRAPH_KEY).is_some_and(|v| !v.is_null())
        && value.get(WALLET_ANALYSIS_KEY).is_some_and(|v| !v.is_null())
}

fn parse_result(value: &Value) -> Result<AnalysisResult, String> {
    let mut subset = serde_json::Map::new();
    for key in [TX_GRAPH_KEY, WALLET_ANALYSIS_KEY] {
        subset.insert(key.to_string(), value[key].clone());
    }
    serde_json::from_value(Value::Object(subset)).map_err(|e| format!("malformed result payload: {}", e))
}

fn job_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_body() -> Value {
        json!({
            "tx_graph": {"nodes": {}, "edges": [{"from": "A", "to": "B", "value": 1.5}]},
            "wallet_analysis": {"funding_sources": []}
        })
    }

    #[test]
    fn test_direct_result() {
        let reply = BackendReply::parse(result_body()).unwrap();
        assert!(matches!(reply, BackendReply::Direct(ref r) if r.transaction_graph.edges.len() == 1));
    }

    #[test]
    fn test_result_fields_win_over_processing_status() {
        let mut body = result_body();
        body["status"] = json!("processing");
        let step = BackendReply::parse(body.clone()).unwrap().into_step(&body).unwrap();
        assert!(matches!(step, PollStep::Resolved(_)));
    }

    #[test]
    fn test_processing_envelope() {
        let body = json!({"status": "processing", "job_id": "job-7"});
        let reply = BackendReply::parse(body.clone()).unwrap();
        assert_eq!(
            reply.clone(),
            BackendReply::StatusWrapped { status: JobStatus::Processing, job_id: Some("job-7".into()), data: None }
        );
        assert_eq!(
            reply.into_step(&body).unwrap(),
            PollStep::Pending { job_id: Some("job-7".into()), status: JobStatus::Processing }
        );
    }

    #[test]
    fn test_completed_envelope() {
        let body = json!({"status": "completed", "data": result_body()});
        let step = BackendReply::parse(body.clone()).unwrap().into_step(&body).unwrap();
        assert!(matches!(step, PollStep::Resolved(_)));
    }

    #[test]
    fn test_completed_without_data_is_violation() {
        let body = json!({"status": "completed"});
        let err = BackendReply::parse(body.clone()).unwrap().into_step(&body).unwrap_err();
        assert_eq!(err.payload(), Some(&body));
    }

    #[test]
    fn test_unknown_status_is_violation() {
        let body = json!({"status": "queued", "job_id": "1"});
        let err = BackendReply::parse(body.clone()).unwrap_err();
        assert_eq!(err.code_str(), "JOB_PROTOCOL_VIOLATION");
        assert_eq!(err.payload(), Some(&body));
    }

    #[test]
    fn test_error_body() {
        let body = json!({"error": "Must Pass Address"});
        let err = BackendReply::parse(body.clone()).unwrap().into_step(&body).unwrap_err();
        assert_eq!(err, AnalysisError::JobFailed { message: "Must Pass Address".into() });
    }

    #[test]
    fn test_non_object_and_empty_bodies() {
        assert!(BackendReply::parse(json!([1, 2])).is_err());
        assert!(BackendReply::parse(json!({})).is_err());
        assert!(BackendReply::parse(json!({"status": 3})).is_err());
    }

    #[test]
    fn test_malformed_result_is_violation() {
        let body = json!({"tx_graph": {"edges": "nope"}, "wallet_analysis": {}});
        assert!(BackendReply::parse(body).unwrap_err().payload().is_some());
    }
}
