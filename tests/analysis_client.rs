//! Poll loop behavior against a scripted backend, on tokio's paused clock

mod common;

use common::{addr, completed, processing, result_body, ScriptedBackend};
use serde_json::json;
use sol_forensics::{AnalysisClient, AnalysisError, BackendResponse, ForensicsConfig};
use std::time::Duration;
use tokio::time::Instant;

fn client(backend: ScriptedBackend) -> AnalysisClient<ScriptedBackend> {
    AnalysisClient::new(backend, ForensicsConfig::default())
}

#[tokio::test(start_paused = true)]
async fn direct_result_needs_no_polling() {
    let a = addr('A');
    let backend = ScriptedBackend::new().on_submit(&a, BackendResponse::json(200, &result_body(7.0)));
    let client = client(backend);

    let result = client.analyze(&a).await.unwrap();

    assert_eq!(result.transaction_graph.edges[0].value, 7.0);
    assert_eq!(client.backend().submits(), vec![a]);
    assert!(client.backend().polls().is_empty());
    assert_eq!(client.telemetry().get_stats().direct_results, 1);
}

#[tokio::test(start_paused = true)]
async fn polls_until_completed_at_fixed_interval() {
    let a = addr('A');
    let backend = ScriptedBackend::new()
        .on_submit(&a, processing("job-1"))
        .on_poll("job-1", vec![processing("job-1"), processing("job-1"), completed(3.0)]);
    let client = client(backend);

    let start = Instant::now();
    let result = client.analyze(&a).await.unwrap();

    assert_eq!(result.transaction_graph.edges[0].value, 3.0);
    let polls = client.backend().polls();
    assert_eq!(polls.len(), 3);
    assert!(polls.iter().all(|(job, _)| job == "job-1"));
    assert_eq!(polls[0].1 - start, Duration::from_secs(5));
    assert_eq!(polls[1].1 - polls[0].1, Duration::from_secs(5));
    assert_eq!(polls[2].1 - polls[1].1, Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn pending_status_keeps_polling() {
    let a = addr('A');
    let backend = ScriptedBackend::new()
        .on_submit(&a, BackendResponse::json(200, &json!({"status": "pending", "job_id": 42})))
        .on_poll(
            "42",
            vec![BackendResponse::json(200, &json!({"status": "pending"})), completed(1.0)],
        );
    let client = client(backend);

    assert!(client.analyze(&a).await.is_ok());
    assert_eq!(client.backend().polls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_poll_budget() {
    let a = addr('A');
    let backend = ScriptedBackend::new().on_submit(&a, processing("slow"));
    let client = client(backend);

    let start = Instant::now();
    let err = client.analyze(&a).await.unwrap_err();

    assert_eq!(err, AnalysisError::Timeout { attempts: 12 });
    assert_eq!(client.backend().polls().len(), 12);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert_eq!(client.telemetry().get_stats().timeouts, 1);
}

#[tokio::test(start_paused = true)]
async fn poll_budget_is_configurable() {
    let a = addr('A');
    let backend = ScriptedBackend::new().on_submit(&a, processing("slow"));
    let config = ForensicsConfig::default()
        .with_max_poll_attempts(3)
        .with_poll_interval(Duration::from_millis(100));
    let client = AnalysisClient::new(backend, config);

    let err = client.analyze(&a).await.unwrap_err();
    assert_eq!(err, AnalysisError::Timeout { attempts: 3 });
    assert_eq!(client.backend().polls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn submit_failure_is_not_retried() {
    let a = addr('A');
    let backend = ScriptedBackend::new().on_submit(&a, BackendResponse::new(500, "boom"));
    let client = client(backend);

    let err = client.analyze(&a).await.unwrap_err();

    assert!(matches!(err, AnalysisError::Transport { status: 500, .. }));
    assert_eq!(err.status(), Some(500));
    assert_eq!(client.backend().submits().len(), 1);
    assert!(client.backend().polls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn poll_failure_stops_the_loop() {
    let a = addr('A');
    let backend = ScriptedBackend::new()
        .on_submit(&a, processing("job-1"))
        .on_poll("job-1", vec![processing("job-1"), BackendResponse::new(503, "")]);
    let client = client(backend);

    let err = client.analyze(&a).await.unwrap_err();

    assert_eq!(err, AnalysisError::Transport { status: 503, body: None });
    assert_eq!(client.backend().polls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unknown_status_is_a_protocol_violation() {
    let a = addr('A');
    let odd = json!({"status": "queued", "job_id": "job-1"});
    let backend = ScriptedBackend::new()
        .on_submit(&a, processing("job-1"))
        .on_poll("job-1", vec![BackendResponse::json(200, &odd)]);
    let client = client(backend);

    let err = client.analyze(&a).await.unwrap_err();

    assert!(matches!(err, AnalysisError::ProtocolViolation { .. }));
    assert_eq!(err.payload(), Some(&odd));
    assert_eq!(client.backend().polls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn submission_without_job_id_is_a_protocol_violation() {
    let a = addr('A');
    let backend = ScriptedBackend::new()
        .on_submit(&a, BackendResponse::json(200, &json!({"status": "processing"})));
    let client = client(backend);

    let err = client.analyze(&a).await.unwrap_err();
    assert!(matches!(err, AnalysisError::ProtocolViolation { .. }));
    assert!(client.backend().polls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn non_json_body_is_a_protocol_violation() {
    let a = addr('A');
    let backend = ScriptedBackend::new().on_submit(&a, BackendResponse::new(200, "<html>"));
    let client = client(backend);

    let err = client.analyze(&a).await.unwrap_err();
    assert_eq!(err.payload(), Some(&json!("<html>")));
}

#[tokio::test(start_paused = true)]
async fn job_error_surfaces_backend_message() {
    let a = addr('A');
    let backend = ScriptedBackend::new()
        .on_submit(&a, processing("job-1"))
        .on_poll(
            "job-1",
            vec![BackendResponse::json(200, &json!({"status": "error", "error": "no transactions"}))],
        );
    let client = client(backend);

    let err = client.analyze(&a).await.unwrap_err();
    assert_eq!(
        err,
        AnalysisError::JobFailed { message: "no transactions".to_string() }
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_address_makes_no_request() {
    let client = client(ScriptedBackend::new());

    let too_short = addr('A')[..43].to_string();
    let too_long = format!("{}X", addr('A'));

    for input in ["", "short", too_short.as_str(), too_long.as_str()] {
        let err = client.analyze(input).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidAddress { .. }), "{input:?}");
    }

    assert!(client.backend().submits().is_empty());
    assert!(client.backend().polls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn padded_address_is_rejected_without_requests() {
    let a = addr('A');
    let backend = ScriptedBackend::new().on_submit(&a, BackendResponse::json(200, &result_body(1.0)));
    let client = client(backend);

    let padded = format!("  {a}  ");
    let err = client.analyze(&padded).await.unwrap_err();

    assert!(matches!(err, AnalysisError::InvalidAddress { .. }));
    assert!(client.backend().submits().is_empty());
    assert!(client.backend().polls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cached_address_skips_submission() {
    let c = addr('C');
    let backend = ScriptedBackend::new().on_poll(&c, vec![completed(9.0)]);
    let config = ForensicsConfig::default().with_cached_addresses([c.clone()]);
    let client = AnalysisClient::new(backend, config);

    let start = Instant::now();
    let result = client.analyze(&c).await.unwrap();

    assert_eq!(result.transaction_graph.edges[0].value, 9.0);
    assert!(client.backend().submits().is_empty());
    let polls = client.backend().polls();
    assert_eq!(polls.len(), 1);
    assert_eq!(polls[0].0, c);
    assert_eq!(polls[0].1, start);
}
