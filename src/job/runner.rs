//! Polls a job until it reaches a terminal status, then fetches its results

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use crate::error::{Result, SdkError};
use super::{Job, JobStatus};

/// Polling policy
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Pause before the first refresh
    pub initial_delay: Duration,
    /// Multiplier applied to the pause after every refresh, must be > 1
    pub backoff_factor: f64,
    /// Ceiling for the pause; `None` lets it grow without bound
    pub max_delay: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            backoff_factor: 1.1,
            max_delay: Some(Duration::from_secs(300)),
        }
    }
}

/// Sequence of poll delays: `initial_delay * factor^n`, optionally capped
///
/// Every delay is greater than or equal to the one before it.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    factor: f64,
    max: Option<Duration>,
}

impl Backoff {
    pub fn new(config: &RunnerConfig) -> Self {
        let mut backoff = Self {
            next: config.initial_delay,
            factor: config.backoff_factor.max(1.0),
            max: config.max_delay,
        };
        backoff.next = backoff.cap(backoff.next);
        backoff
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Returns the current delay and advances to the next one
    ///
    /// Growth saturates at `Duration::MAX` when no ceiling is set.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.next;
        let grown = Duration::try_from_secs_f64(current.as_secs_f64() * self.factor)
            .unwrap_or(Duration::MAX)
            .max(current);
        self.next = self.cap(grown);
        current
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}

/// Outcome of a successful run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of server refreshes performed
    pub polls: usize,
    /// Files written to the download directory
    pub downloaded: Vec<PathBuf>,
    /// Titles of external results that were not downloaded
    pub skipped: Vec<String>,
}

/// Drives a single job to completion
///
/// The loop is sequential: it sleeps, refreshes, and checks the status,
/// never polling the same job concurrently. Dropping the future abandons
/// the wait without affecting the job on the server; use
/// [`JobRunner::run_with_timeout`] for a bounded wait.
pub struct JobRunner {
    job: Job,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(job: Job) -> Self {
        Self::with_config(job, RunnerConfig::default())
    }

    pub fn with_config(job: Job, config: RunnerConfig) -> Self {
        Self { job, config }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    /// Polls until the job is `successful`
    ///
    /// The status known at submission is used for the first check, so a job
    /// already terminal is never refreshed.
    ///
    /// # Returns
    ///
    /// The number of refreshes performed
    pub async fn wait(&mut self) -> Result<usize> {
        let mut backoff = Backoff::new(&self.config);
        let mut polls = 0;

        loop {
            log::info!(
                "Job: {} - Status: {} at {}",
                self.job.job_id,
                self.job.status,
                Utc::now().to_rfc3339()
            );

            match &self.job.status {
                JobStatus::Successful => return Ok(polls),
                JobStatus::Failed => {
                    return Err(SdkError::JobFailed {
                        job_id: self.job.job_id.clone(),
                    });
                }
                JobStatus::Accepted | JobStatus::Running => {}
                JobStatus::Other(status) => {
                    return Err(SdkError::UnexpectedJobStatus {
                        job_id: self.job.job_id.clone(),
                        status: status.clone(),
                    });
                }
            }

            sleep(backoff.next_delay()).await;
            self.job.refresh().await?;
            polls += 1;
        }
    }

    /// Waits for the job, then downloads every `result` artifact
    ///
    /// `enclosure` results are external references; they are logged and
    /// listed in [`RunReport::skipped`] rather than treated as errors.
    pub async fn run(&mut self, download_dir: Option<&Path>) -> Result<RunReport> {
        let polls = self.wait().await?;
        let mut report = RunReport {
            polls,
            ..RunReport::default()
        };

        for result in self.job.results().await? {
            match result.download(download_dir).await {
                Ok(path) => report.downloaded.push(path),
                Err(SdkError::NotDownloadable(title)) => {
                    log::info!("{}", title);
                    report.skipped.push(title);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Like [`JobRunner::run`], giving up with `SdkError::Timeout` after `limit`
    pub async fn run_with_timeout(&mut self, download_dir: Option<&Path>, limit: Duration) -> Result<RunReport> {
        timeout(limit, self.run(download_dir))
            .await
            .map_err(|_| SdkError::Timeout)?
    }
}
