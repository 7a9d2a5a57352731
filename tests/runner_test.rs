mod common;

use common::*;
use eocanvas_rust_sdk::prelude::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Job detail mock answering with `statuses` in order
fn job_sequence(job_id: &str, statuses: &[&str]) -> Mock {
    let responses = statuses
        .iter()
        .map(|status| json_response(job_body(job_id, status)))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/api/jobs/{}", job_id)))
        .respond_with(Sequence::new(responses))
}

async fn mount_job_sequence(server: &MockServer, job_id: &str, statuses: &[&str]) {
    job_sequence(job_id, statuses).mount(server).await;
}

#[tokio::test]
async fn test_run_until_successful_and_download() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    // one fetch for get_job, then one refresh per iteration
    job_sequence("j1", &["accepted", "running", "successful"])
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/j1/results"))
        .respond_with(json_response(json!([
            {"href": "/download/j1/a", "title": "a.tif", "rel": "result"},
            {"href": "https://elsewhere/b", "title": "b.nc", "rel": "enclosure"},
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/j1/a"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"A".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let job = api.get_job("j1").await.unwrap();
    assert_eq!(job.status, JobStatus::Accepted);

    let dir = tempfile::tempdir().unwrap();
    let mut runner = JobRunner::with_config(job, fast_runner());
    let report = runner.run(Some(dir.path())).await.unwrap();

    assert_eq!(report.polls, 2);
    assert_eq!(report.downloaded, vec![dir.path().join("a.tif")]);
    assert_eq!(report.skipped, vec!["b.nc".to_string()]);
    assert!(runner.job().is_completed());
}

#[tokio::test]
async fn test_completed_counts_as_success() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    job_sequence("j2", &["running", "completed"])
        .expect(2)
        .mount(&server)
        .await;

    let job = api(&server).get_job("j2").await.unwrap();
    let mut runner = JobRunner::with_config(job, fast_runner());
    assert_eq!(runner.wait().await.unwrap(), 1);
    assert_eq!(runner.job().status, JobStatus::Successful);
}

#[tokio::test]
async fn test_failed_job() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    // no refresh after `failed` is observed
    job_sequence("j3", &["accepted", "failed", "running"])
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/j3/results"))
        .respond_with(json_response(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let job = api(&server).get_job("j3").await.unwrap();
    let mut runner = JobRunner::with_config(job, fast_runner());
    let err = runner.run(None).await.unwrap_err();

    assert!(matches!(err, SdkError::JobFailed { ref job_id } if job_id == "j3"));
    assert_eq!(
        err.to_string(),
        "Job j3 failed. Try checking the logs for more info."
    );
}

#[tokio::test]
async fn test_unexpected_status() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    job_sequence("j4", &["running", "dismissed"])
        .expect(2)
        .mount(&server)
        .await;

    let job = api(&server).get_job("j4").await.unwrap();
    let err = JobRunner::with_config(job, fast_runner())
        .wait()
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::UnexpectedJobStatus { ref status, .. } if status == "dismissed"));
}

#[tokio::test]
async fn test_terminal_status_is_sticky() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    job_sequence("j5", &["successful", "running"])
        .expect(2)
        .mount(&server)
        .await;

    let api = api(&server);
    let mut job = api.get_job("j5").await.unwrap();
    assert!(job.is_completed());
    job.refresh().await.unwrap();
    assert!(job.is_completed());
}

#[tokio::test]
async fn test_run_with_timeout() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_job_sequence(&server, "j6", &["running"]).await;

    let job = api(&server).get_job("j6").await.unwrap();
    let mut runner = JobRunner::with_config(job, fast_runner());
    let err = runner
        .run_with_timeout(None, Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Timeout));
}

#[tokio::test]
async fn test_process_run_submits_and_waits() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/processes/shearwater-demo/execution"))
        .respond_with(ResponseTemplate::new(201).set_body_json(job_body("j7", "accepted")))
        .expect(1)
        .mount(&server)
        .await;
    job_sequence("j7", &["successful"])
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/j7/results"))
        .respond_with(json_response(json!([])))
        .mount(&server)
        .await;

    let process = Process::shearwater("Sindian", "2024-01-01", "2024-01-02").unwrap();
    let report = process
        .run_with_config(&api(&server), None, None, fast_runner())
        .await
        .unwrap();
    assert_eq!(report.polls, 1);
    assert!(report.downloaded.is_empty());
}
