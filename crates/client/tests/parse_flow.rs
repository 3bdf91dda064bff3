//! End-to-end parse flows against a mock Invaro service
//!
//! **Coverage:**
//! - upload → submit → poll-to-completion for statements
//! - batch submit + concurrent polling for invoices, order preservation
//! - error surfacing: service rejection and failed jobs through the facade

use std::io::Write;
use std::time::Duration;

use invaro_client::{InvaroClient, InvaroError, JobId, JobStatus};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> InvaroClient {
    InvaroClient::builder()
        .api_key("integration-key")
        .base_url(server.uri())
        .poll_interval(Duration::from_millis(20))
        .build()
        .expect("client")
}

#[tokio::test]
async fn statement_flow_upload_submit_wait() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/parse/upload"))
        .and(header("Authorization", "Bearer integration-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"documents": [{"id": "doc-1"}]}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/parse/statements"))
        .and(body_json(json!({"document_id": "doc-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"job_id": "job-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/parse/statements/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"status": "completed", "accounts": [{"iban": "DE02"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let statement = dir.path().join("statement.pdf");
    let mut file = std::fs::File::create(&statement).expect("create");
    file.write_all(b"%PDF-1.4 statement").expect("write");

    let client = client_for(&server);

    let uploaded = client.upload_documents(&[&statement]).await.expect("upload");
    let document_id = uploaded["documents"][0]["id"].as_str().expect("document id");

    let state = client.process_statements_and_wait(document_id).await.expect("parse");
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.details["accounts"][0]["iban"], "DE02");
}

#[tokio::test]
async fn invoice_batch_wait_returns_results_in_submission_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/parse/invoices/batch"))
        .and(body_json(json!({
            "files": [{"document_id": "d1"}, {"document_id": "d2"}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"job_ids": ["j1", "j2"]}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    // j1 finishes last in wall-clock time; results must still come back j1, j2.
    Mock::given(method("GET"))
        .and(path("/parse/invoices/j1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"status": "completed", "invoice": "d1"}}))
                .set_delay(Duration::from_millis(60)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/parse/invoices/j2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"status": "completed", "invoice": "d2"}})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let states =
        client.process_invoices_batch_and_wait(&["d1", "d2"]).await.expect("batch results");

    assert_eq!(states.len(), 2);
    assert_eq!(states[0].details["invoice"], "d1");
    assert_eq!(states[1].details["invoice"], "d2");
}

#[tokio::test]
async fn batch_without_wait_returns_accepted_job_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/parse/statements/batch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"job_ids": ["j1", "j2"], "queued": 2}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let accepted = client.process_statements_batch(&["d1", "d2"]).await.expect("accepted");

    assert_eq!(accepted.job_ids, vec![JobId::from("j1"), JobId::from("j2")]);
    assert_eq!(accepted.extra["queued"], 2);
    // No status endpoint was ever hit.
    let polls = server
        .received_requests()
        .await
        .expect("requests")
        .iter()
        .filter(|r| r.method == wiremock::http::Method::GET)
        .count();
    assert_eq!(polls, 0);
}

#[tokio::test]
async fn failed_job_surfaces_through_the_facade() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/parse/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"job_id": "j9"}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/parse/invoices/j9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "failed"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.process_invoices_and_wait("d1").await.expect_err("failure");

    assert!(matches!(err, InvaroError::JobFailed { .. }));
    assert_eq!(err.to_string(), "job j9 failed");
}

#[tokio::test]
async fn service_rejection_carries_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/parse/statements"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid api key"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.process_statements("d1").await.expect_err("rejection");

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "401: invalid api key");
}
