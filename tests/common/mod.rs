#![allow(dead_code)]

use eocanvas_rust_sdk::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "test-access-token";

/// Serves the given responses in order, repeating the last one
pub struct Sequence {
    calls: AtomicUsize,
    responses: Vec<ResponseTemplate>,
}

impl Sequence {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            responses,
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.responses.len() - 1);
        self.responses[index].clone()
    }
}

pub fn token_body(expires_in: i64) -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "test-refresh-token",
        "expires_in": expires_in,
    })
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(3600)))
        .mount(server)
        .await;
}

pub fn urls(server: &MockServer) -> Urls {
    Urls::new(
        format!("{}/token/", server.uri()),
        format!("{}/api", server.uri()),
    )
}

pub fn api(server: &MockServer) -> Api {
    let credentials = Credentials::new("user", "password").unwrap();
    let http = RetryClient::new(2, 0.001).unwrap();
    Api::with_retry_client(urls(server), credentials, http).unwrap()
}

pub fn fast_runner() -> RunnerConfig {
    RunnerConfig {
        initial_delay: Duration::from_millis(5),
        backoff_factor: 1.5,
        max_delay: Some(Duration::from_millis(20)),
    }
}

pub fn job_body(job_id: &str, status: &str) -> Value {
    json!({
        "processID": "snap-function",
        "type": "process",
        "jobID": job_id,
        "status": status,
        "started": "2024-08-01T13:23:46Z",
        "updated": "2024-08-01T13:24:08.592105096Z",
    })
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
