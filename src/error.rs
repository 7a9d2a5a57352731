//! Error types for the EO Canvas Rust SDK

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for SDK operations
pub type Result<T, E = SdkError> = std::result::Result<T, E>;

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// Username or password contain whitespace or are empty
    #[error("Username and/or password malformed. Please review them.")]
    MalformedCredentials,

    /// The credentials file does not exist
    #[error("Missing credentials file at {0}. Please save them again.")]
    CredentialsNotFound(PathBuf),

    /// The credentials file exists but cannot be read back
    #[error("Credentials could not be read from {0}. Please save them again.")]
    CorruptedCredentials(PathBuf),

    /// HTTP transport errors
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status returned by the service
    #[error("HTTP {status} error: {message}")]
    Http { status: u16, message: String },

    /// Transient server errors persisted past the retry budget
    #[error("Maximum retries ({retries}) reached for {method} {url}")]
    MaxRetries {
        method: String,
        url: String,
        retries: usize,
    },

    /// HTTP 429 from the service
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A job reached the `failed` state
    #[error("Job {job_id} failed. Try checking the logs for more info.")]
    JobFailed { job_id: String },

    /// The runner observed a status outside of the known lifecycle
    #[error("Job {job_id} reported unexpected status '{status}'")]
    UnexpectedJobStatus { job_id: String, status: String },

    /// The result is an external reference and is not served by this service
    #[error("Result '{0}' is an external reference, not served by this service")]
    NotDownloadable(String),

    /// The result relation is neither `result` nor `enclosure`
    #[error("rel {0} not known")]
    UnknownResultType(String),

    /// Parameter validation errors, raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Encryption/key errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// SNAP graph could not be decoded
    #[error("Malformed SNAP graph: {0}")]
    MalformedSnap(String),

    /// Data Tailor chain could not be decoded
    #[error("Invalid Data Tailor chain: {0}")]
    InvalidChain(String),

    /// Invalid configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Timeout errors
    #[error("Operation timed out")]
    Timeout,
}

impl SdkError {
    /// True for the local credential file family of errors
    pub fn is_credentials_error(&self) -> bool {
        matches!(
            self,
            SdkError::MalformedCredentials
                | SdkError::CredentialsNotFound(_)
                | SdkError::CorruptedCredentials(_)
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Http { status, .. } => Some(*status),
            SdkError::QuotaExceeded(_) => Some(429),
            SdkError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<rsa::Error> for SdkError {
    fn from(e: rsa::Error) -> Self {
        SdkError::Crypto(format!("RSA error: {}", e))
    }
}

impl From<base64::DecodeError> for SdkError {
    fn from(e: base64::DecodeError) -> Self {
        SdkError::Crypto(format!("Base64 decode error: {}", e))
    }
}
