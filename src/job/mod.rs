//! Jobs: submitted executions of a process, their results and logs

mod result;
mod runner;

pub use result::{JobResult, LogEntry, LogEntryResponse, ResultRel, ResultResponse};
pub use runner::{Backoff, JobRunner, RunReport, RunnerConfig};

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::api::Api;
use crate::error::Result;

/// Job status constants
pub const JOB_STATUS_ACCEPTED: &str = "accepted";
pub const JOB_STATUS_RUNNING: &str = "running";
pub const JOB_STATUS_SUCCESSFUL: &str = "successful";
pub const JOB_STATUS_FAILED: &str = "failed";
/// Alternate spelling of terminal success some endpoints report
pub const JOB_STATUS_COMPLETED: &str = "completed";

/// Lifecycle state of a job
///
/// `completed` on the wire is folded into [`JobStatus::Successful`], the
/// single terminal-success value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Accepted,
    Running,
    Successful,
    Failed,
    /// Anything the service reports outside the known lifecycle
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Accepted => JOB_STATUS_ACCEPTED,
            JobStatus::Running => JOB_STATUS_RUNNING,
            JobStatus::Successful => JOB_STATUS_SUCCESSFUL,
            JobStatus::Failed => JOB_STATUS_FAILED,
            JobStatus::Other(status) => status,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Successful | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            JOB_STATUS_ACCEPTED => JobStatus::Accepted,
            JOB_STATUS_RUNNING => JobStatus::Running,
            JOB_STATUS_SUCCESSFUL | JOB_STATUS_COMPLETED => JobStatus::Successful,
            JOB_STATUS_FAILED => JobStatus::Failed,
            _ => JobStatus::Other(status),
        }
    }
}

impl From<&str> for JobStatus {
    fn from(status: &str) -> Self {
        JobStatus::from(status.to_string())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job representation as returned by the service
#[derive(Deserialize, Debug, Clone)]
pub struct JobResponse {
    #[serde(rename = "jobID")]
    pub job_id: String,
    pub status: JobStatus,
    pub started: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub finished: Option<String>,
}

/// Wrapper of the job list endpoint
#[derive(Deserialize, Debug)]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
}

/// One submitted execution of a process
#[derive(Debug, Clone)]
pub struct Job {
    api: Api,
    pub job_id: String,
    pub status: JobStatus,
    pub started: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub finished: Option<String>,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job {} (status: {})", self.job_id, self.status)
    }
}

impl Job {
    pub(crate) fn from_response(api: Api, data: JobResponse) -> Self {
        Self {
            api,
            job_id: data.job_id,
            status: data.status,
            started: data.started,
            created: data.created,
            updated: data.updated,
            finished: data.finished,
        }
    }

    /// True once the job reached terminal success
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Successful
    }

    /// Applies a fresh server representation in place
    ///
    /// The identifier never changes. Once the job is `successful` or
    /// `failed` the status is frozen; a different status reported afterwards
    /// is logged and ignored.
    pub fn update(&mut self, data: JobResponse) {
        if self.status.is_terminal() && data.status != self.status {
            log::warn!(
                "Job {} reported {} after terminal status {}, ignoring",
                self.job_id,
                data.status,
                self.status
            );
        } else {
            self.status = data.status;
        }
        self.created = data.created;
        self.updated = data.updated;
        self.finished = data.finished;
    }

    /// Reloads status and timestamps from the API
    pub async fn refresh(&mut self) -> Result<()> {
        let data = self.api.fetch_job(&self.job_id).await?;
        self.update(data);
        Ok(())
    }

    pub async fn logs(&self) -> Result<Vec<LogEntry>> {
        self.api.get_job_logs(&self.job_id).await
    }

    pub async fn results(&self) -> Result<Vec<JobResult>> {
        self.api.get_job_results(&self.job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::config::Urls;

    fn api() -> Api {
        Api::new(Urls::default(), Credentials::new("u", "p").unwrap()).unwrap()
    }

    fn response(status: &str) -> JobResponse {
        serde_json::from_value(serde_json::json!({
            "processID": "snap-function",
            "type": "process",
            "jobID": "93fc7efb-4860-5de1-bd75-ca850685bed4",
            "status": status,
            "started": "2024-08-01:13.23.46",
            "updated": "2024-08-01T13:24:08.592105096Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(JobStatus::from("accepted"), JobStatus::Accepted);
        assert_eq!(JobStatus::from("completed"), JobStatus::Successful);
        assert_eq!(
            JobStatus::from("dismissed"),
            JobStatus::Other("dismissed".to_string())
        );
        assert_eq!(String::from(JobStatus::Successful), "successful");
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_job_response_deserialization() {
        let data = response("running");
        assert_eq!(data.job_id, "93fc7efb-4860-5de1-bd75-ca850685bed4");
        assert_eq!(data.status, JobStatus::Running);
        assert_eq!(data.created, None);
        assert!(data.updated.is_some());
    }

    #[test]
    fn test_job_response_requires_started() {
        let data = serde_json::from_value::<JobResponse>(serde_json::json!({
            "jobID": "1",
            "status": "accepted",
        }));
        assert!(data.is_err());
    }

    #[test]
    fn test_update_keeps_id_and_moves_status() {
        let mut job = Job::from_response(api(), response("accepted"));
        job.update(response("running"));
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.job_id, "93fc7efb-4860-5de1-bd75-ca850685bed4");
        assert!(!job.is_completed());

        job.update(response("completed"));
        assert!(job.is_completed());
    }

    #[test]
    fn test_terminal_status_is_sticky() {
        let mut job = Job::from_response(api(), response("failed"));
        job.update(response("running"));
        assert_eq!(job.status, JobStatus::Failed);
    }
}
