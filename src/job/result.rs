//! Result references and log entries of a job

use chrono::{DateTime, FixedOffset, SubsecRound};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use crate::api::Api;
use crate::error::{Result, SdkError};

/// Relation of a result to this service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultRel {
    /// Served by this service, downloadable
    Result,
    /// External reference, not downloadable here
    Enclosure,
    Other(String),
}

impl From<String> for ResultRel {
    fn from(rel: String) -> Self {
        match rel.as_str() {
            "result" => ResultRel::Result,
            "enclosure" => ResultRel::Enclosure,
            _ => ResultRel::Other(rel),
        }
    }
}

impl fmt::Display for ResultRel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultRel::Result => f.write_str("result"),
            ResultRel::Enclosure => f.write_str("enclosure"),
            ResultRel::Other(rel) => f.write_str(rel),
        }
    }
}

fn default_rel() -> String {
    "result".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResultResponse {
    pub href: String,
    pub title: String,
    #[serde(default = "default_rel")]
    pub rel: String,
}

/// Reference to one output artifact of a job
#[derive(Debug, Clone)]
pub struct JobResult {
    api: Api,
    pub href: String,
    pub title: String,
    pub rel: ResultRel,
}

impl JobResult {
    pub(crate) fn from_response(api: Api, data: ResultResponse) -> Self {
        Self {
            api,
            href: data.href,
            title: data.title,
            rel: ResultRel::from(data.rel),
        }
    }

    /// Title reduced to a bare file name
    pub fn file_name(&self) -> String {
        sanitize_title(&self.title)
    }

    /// Downloads the artifact into `download_dir` (current directory if `None`)
    ///
    /// Enclosures fail with `NotDownloadable`, unknown relations with
    /// `UnknownResultType`.
    pub async fn download(&self, download_dir: Option<&Path>) -> Result<PathBuf> {
        match &self.rel {
            ResultRel::Result => self.api.download_result(self, download_dir).await,
            ResultRel::Enclosure => Err(SdkError::NotDownloadable(self.title.clone())),
            ResultRel::Other(rel) => Err(SdkError::UnknownResultType(rel.clone())),
        }
    }
}

/// Strips any directory part from a result title
fn sanitize_title(title: &str) -> String {
    let name = title
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default()
        .trim();
    match name {
        "" | "." | ".." => "result".to_string(),
        name => name.to_string(),
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct LogEntryResponse {
    pub timestamp: String,
    pub message: String,
}

/// One line of a job log
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Truncated to microseconds
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
}

impl TryFrom<LogEntryResponse> for LogEntry {
    type Error = SdkError;

    fn try_from(data: LogEntryResponse) -> Result<Self> {
        let timestamp = DateTime::parse_from_rfc3339(&data.timestamp).map_err(|e| {
            SdkError::Validation(format!("Invalid log timestamp '{}': {}", data.timestamp, e))
        })?;
        Ok(Self {
            timestamp: timestamp.trunc_subsecs(6),
            message: data.message,
        })
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timestamp.to_rfc3339(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("output.nc"), "output.nc");
        assert_eq!(sanitize_title("a/b/output.nc"), "output.nc");
        assert_eq!(sanitize_title("..\\..\\evil.sh"), "evil.sh");
        assert_eq!(sanitize_title("dir/"), "result");
        assert_eq!(sanitize_title(".."), "result");
    }

    #[test]
    fn test_result_rel_default() {
        let data: ResultResponse =
            serde_json::from_str(r#"{"href": "/download/result/1", "title": "title1"}"#).unwrap();
        assert_eq!(ResultRel::from(data.rel), ResultRel::Result);
        assert_eq!(ResultRel::from("enclosure".to_string()), ResultRel::Enclosure);
    }

    #[test]
    fn test_log_entry_truncates_to_microseconds() {
        let entry = LogEntry::try_from(LogEntryResponse {
            timestamp: "2024-12-06T15:31:45.123456789+00:00".to_string(),
            message: "message1".to_string(),
        })
        .unwrap();

        assert_eq!(entry.timestamp.nanosecond(), 123_456_000);
        assert_eq!(entry.message, "message1");
    }

    #[test]
    fn test_log_entry_invalid_timestamp() {
        let err = LogEntry::try_from(LogEntryResponse {
            timestamp: "yesterday".to_string(),
            message: "m".to_string(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }
}
