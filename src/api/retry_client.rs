//! HTTP transport with bounded retries on transient server errors

use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use crate::error::{Result, SdkError};

/// Statuses treated as transient
const RETRY_STATUSES: &[u16] = &[500, 502, 503, 504];

/// Upper bound of a single retry pause
const BACKOFF_MAX: Duration = Duration::from_secs(120);

/// `2^64` already exceeds any sensible pause; larger attempts are clamped
const MAX_BACKOFF_EXPONENT: usize = 64;

/// Request body variants understood by the service
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Deserialize)]
struct QuotaMessage {
    message: String,
}

/// Transport client that retries idempotent requests on 500/502/503/504
///
/// The delay before retry `n` (0-based) is `backoff_factor * 2^n` seconds,
/// capped at two minutes. Non-idempotent requests are sent exactly once.
#[derive(Debug, Clone)]
pub struct RetryClient {
    http_client: HttpClient,
    max_retries: usize,
    backoff_factor: f64,
}

impl RetryClient {
    /// Creates a new retry client
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Maximum number of retry attempts after the first try
    /// * `backoff_factor` - Base of the exponential pause between attempts, in seconds
    ///
    /// # Example
    ///
    /// ```rust
    /// use eocanvas_rust_sdk::api::RetryClient;
    ///
    /// let client = RetryClient::new(5, 0.25).unwrap();
    /// assert_eq!(client.max_retries(), 5);
    /// ```
    pub fn new(max_retries: usize, backoff_factor: f64) -> Result<Self> {
        let http_client = HttpClient::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            max_retries,
            backoff_factor,
        })
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Pause before retry number `attempt`, never above `BACKOFF_MAX`
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.min(MAX_BACKOFF_EXPONENT) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(secs.min(BACKOFF_MAX.as_secs_f64()))
    }

    fn is_idempotent(method: &Method) -> bool {
        matches!(
            *method,
            Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE
        )
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        bearer: Option<&str>,
        body: &Body,
    ) -> std::result::Result<Response, reqwest::Error> {
        let mut request = self.http_client.request(method.clone(), url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(value),
            Body::Form(fields) => request.form(fields),
        };
        request.send().await
    }

    /// Sends a request, retrying transient failures
    ///
    /// The response is returned whatever its status, except for 429 which
    /// always becomes `SdkError::QuotaExceeded`. Callers that need to inspect
    /// 4xx statuses use this; everything else goes through [`RetryClient::send`].
    pub async fn send_raw(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: &Body,
    ) -> Result<Response> {
        let retries = if Self::is_idempotent(&method) {
            self.max_retries
        } else {
            0
        };

        log::debug!("Request: {} {}", method, url);

        let mut attempt = 0;
        let response = loop {
            match self.send_once(&method, url, bearer, body).await {
                Ok(response) if RETRY_STATUSES.contains(&response.status().as_u16()) => {
                    if retries == 0 {
                        break response;
                    }
                    if attempt >= retries {
                        return Err(self.max_retries_error(&method, url));
                    }
                    log::warn!(
                        "{} {} returned {}, retrying ({}/{})",
                        method,
                        url,
                        response.status(),
                        attempt + 1,
                        retries
                    );
                }
                Ok(response) => break response,
                Err(e) if retries > 0 && (e.is_connect() || e.is_timeout()) => {
                    if attempt >= retries {
                        return Err(self.max_retries_error(&method, url));
                    }
                    log::warn!("{} {} failed: {}, retrying", method, url, e);
                }
                Err(e) => return Err(e.into()),
            }
            sleep(self.backoff_delay(attempt)).await;
            attempt += 1;
        };

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<QuotaMessage>(&text)
                .map(|q| q.message)
                .unwrap_or(text);
            return Err(SdkError::QuotaExceeded(message));
        }

        Ok(response)
    }

    /// Sends a request and fails on any non-2xx status
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        bearer: Option<&str>,
        body: &Body,
    ) -> Result<Response> {
        let response = self.send_raw(method, url, bearer, body).await?;
        Self::check_status(response).await
    }

    /// Converts a non-2xx response into `SdkError::Http`
    pub async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::error!("HTTP {} - {}", status.as_u16(), message);

        Err(SdkError::Http {
            status: status.as_u16(),
            message,
        })
    }

    fn max_retries_error(&self, method: &Method, url: &str) -> SdkError {
        SdkError::MaxRetries {
            method: method.to_string(),
            url: url.to_string(),
            retries: self.max_retries,
        }
    }
}
