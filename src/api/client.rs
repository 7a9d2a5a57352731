//! Authenticated session against the serverless functions API

use futures_util::StreamExt;
use reqwest::{Method, Response, StatusCode};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use url::Url;
use crate::auth::{Credentials, OAuthToken};
use crate::config::Urls;
use crate::error::Result;
use crate::job::{Job, JobListResponse, JobResponse, JobResult, LogEntry, LogEntryResponse, ResultResponse};
use crate::keystore::{Key, KeyResponse};
use crate::process::{Process, ProcessResponse};
use super::retry_client::{Body, RetryClient};

/// Key id under which the service publishes its encryption certificate
const PUBLIC_KEY_ID: &str = "cert/public";

/// Shared, authenticated API session
///
/// Cloning is cheap and every clone shares the same bearer token. Jobs,
/// results and keys keep a clone to perform follow-up calls.
#[derive(Clone)]
pub struct Api {
    urls: Arc<Urls>,
    http: RetryClient,
    token: OAuthToken,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.urls.base_url)
            .finish()
    }
}

impl Api {
    /// Creates a new session with the default retry policy (5 retries, 0.25 s backoff)
    ///
    /// # Example
    ///
    /// ```rust
    /// use eocanvas_rust_sdk::{Api, Credentials, config::Urls};
    ///
    /// let credentials = Credentials::new("user", "password").unwrap();
    /// let api = Api::new(Urls::default(), credentials).unwrap();
    /// ```
    pub fn new(urls: Urls, credentials: Credentials) -> Result<Self> {
        Self::with_retry_client(urls, credentials, RetryClient::new(5, 0.25)?)
    }

    /// Creates a new session on top of a preconfigured transport
    pub fn with_retry_client(urls: Urls, credentials: Credentials, http: RetryClient) -> Result<Self> {
        let token = OAuthToken::new(&urls.token_url, credentials, http.clone())?;
        Ok(Self {
            urls: Arc::new(urls),
            http,
            token,
        })
    }

    /// Creates a session from the built-in endpoints and the saved `.hdarc` credentials
    pub fn from_env() -> Result<Self> {
        Self::new(Urls::default(), Credentials::load()?)
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }

    pub fn token(&self) -> &OAuthToken {
        &self.token
    }

    /// Performs an authenticated request
    ///
    /// A 401 invalidates the token and the request is replayed once with a
    /// fresh one.
    async fn request(&self, method: Method, url: &str, body: Body) -> Result<Response> {
        let token = self.token.access_token().await?;
        let response = self
            .http
            .send_raw(method.clone(), url, Some(&token), &body)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            log::debug!("Bearer token rejected, requesting a new one");
            self.token.invalidate().await;
            let token = self.token.access_token().await?;
            let response = self.http.send_raw(method, url, Some(&token), &body).await?;
            return RetryClient::check_status(response).await;
        }

        RetryClient::check_status(response).await
    }

    async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, Body::Empty).await
    }

    /// Fetches the PEM-encoded RSA key used to encrypt key configurations
    pub async fn get_public_key(&self) -> Result<Vec<u8>> {
        let url = self.urls.get("key_detail", &[("key_id", PUBLIC_KEY_ID)])?;
        let response = self.get(&url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn get_key(&self, key_id: &str) -> Result<Key> {
        let url = self.urls.get("key_detail", &[("key_id", key_id)])?;
        let data: KeyResponse = self.get(&url).await?.json().await?;
        Key::from_response(self.clone(), data)
    }

    pub async fn get_keys(&self) -> Result<Vec<Key>> {
        let url = self.urls.get("key_list", &[])?;
        let data: Vec<KeyResponse> = self.get(&url).await?.json().await?;
        data.into_iter()
            .map(|key| Key::from_response(self.clone(), key))
            .collect()
    }

    /// Registers a key; its configuration is encrypted before leaving the client
    ///
    /// The service answers with an empty body, so the key itself is returned.
    pub async fn create_key(&self, key: Key) -> Result<Key> {
        let body = key.request_body().await?;
        let url = self.urls.get("key_list", &[])?;
        self.request(Method::POST, &url, Body::Json(body)).await?;
        log::info!("Key {} created", key.name);
        Ok(key)
    }

    pub async fn delete_key(&self, key_id: &str) -> Result<()> {
        let url = self.urls.get("key_detail", &[("key_id", key_id)])?;
        self.request(Method::DELETE, &url, Body::Empty).await?;
        log::info!("Key {} deleted", key_id);
        Ok(())
    }

    /// Gets the details of a process
    pub async fn get_process(&self, process_id: &str) -> Result<Process> {
        let url = self.urls.get("process_detail", &[("process_id", process_id)])?;
        let data: ProcessResponse = self.get(&url).await?.json().await?;
        Ok(Process::from(data))
    }

    /// Gets the list of available processes
    pub async fn get_processes(&self) -> Result<Vec<Process>> {
        let url = self.urls.get("process_list", &[])?;
        let data: Vec<ProcessResponse> = self.get(&url).await?.json().await?;
        Ok(data.into_iter().map(Process::from).collect())
    }

    /// Submits a process and returns the job tracking its execution
    pub async fn exec_process(&self, process: &Process) -> Result<Job> {
        let inputs = process.prepare_inputs()?;
        let url = self
            .urls
            .get("process_execution", &[("process_id", &process.process_id)])?;
        let body = Body::Json(serde_json::to_value(&inputs)?);
        let data: JobResponse = self.request(Method::POST, &url, body).await?.json().await?;

        log::info!("Process {} submitted as job {}", process.process_id, data.job_id);
        Ok(Job::from_response(self.clone(), data))
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        Ok(Job::from_response(self.clone(), self.fetch_job(job_id).await?))
    }

    pub(crate) async fn fetch_job(&self, job_id: &str) -> Result<JobResponse> {
        let url = self.urls.get("job_detail", &[("job_id", job_id)])?;
        Ok(self.get(&url).await?.json().await?)
    }

    /// Gets the list of jobs submitted by the user
    pub async fn get_jobs(&self) -> Result<Vec<Job>> {
        let url = self.urls.get("job_list", &[])?;
        let data: JobListResponse = self.get(&url).await?.json().await?;
        Ok(data
            .jobs
            .into_iter()
            .map(|job| Job::from_response(self.clone(), job))
            .collect())
    }

    pub async fn get_job_logs(&self, job_id: &str) -> Result<Vec<LogEntry>> {
        let url = self.urls.get("job_logs", &[("job_id", job_id)])?;
        let data: Vec<LogEntryResponse> = self.get(&url).await?.json().await?;
        data.into_iter().map(LogEntry::try_from).collect()
    }

    pub async fn get_job_results(&self, job_id: &str) -> Result<Vec<JobResult>> {
        let url = self.urls.get("job_results", &[("job_id", job_id)])?;
        let data: Vec<ResultResponse> = self.get(&url).await?.json().await?;
        Ok(data
            .into_iter()
            .map(|result| JobResult::from_response(self.clone(), result))
            .collect())
    }

    /// True if `url` shares scheme, host and port with the API base URL
    fn is_service_origin(&self, url: &Url) -> bool {
        Url::parse(&self.urls.base_url)
            .map(|base| base.origin() == url.origin())
            .unwrap_or(false)
    }

    /// Streams a result to `<download_dir>/<sanitized title>`
    ///
    /// Relative hrefs go through the `download` endpoint. An absolute href
    /// only gets the bearer token when it points at the API's own origin.
    ///
    /// The directory is created if needed. A partially written file is left
    /// in place when the transfer fails.
    ///
    /// # Returns
    ///
    /// The path of the written file
    pub async fn download_result(&self, result: &JobResult, download_dir: Option<&Path>) -> Result<PathBuf> {
        let download_dir = download_dir.unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(download_dir).await?;

        let response = match Url::parse(&result.href) {
            Ok(href) if self.is_service_origin(&href) => self.get(href.as_str()).await?,
            Ok(href) => {
                log::debug!("{} is outside the service, downloading without credentials", href);
                self.http
                    .send(Method::GET, href.as_str(), None, &Body::Empty)
                    .await?
            }
            Err(_) => {
                let url = self.urls.get("download", &[("result_href", &result.href)])?;
                self.get(&url).await?
            }
        };

        let download_path = download_dir.join(result.file_name());
        log::info!("Downloading {}", download_path.display());

        let mut file = tokio::fs::File::create(&download_path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        Ok(download_path)
    }
}
