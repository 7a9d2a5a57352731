//! Lists jobs, shows the logs of the most recent one and waits for it

use eocanvas_rust_sdk::prelude::*;
use std::error::Error;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let api = Api::from_env()?;

    let jobs = api.get_jobs().await?;
    println!("=== {} jobs ===", jobs.len());
    for job in &jobs {
        println!("   {}", job);
    }

    let Some(job) = jobs.into_iter().next() else {
        return Ok(());
    };

    println!("\nLogs of {}:", job.job_id);
    for entry in job.logs().await? {
        println!("   [{}] {}", entry.timestamp, entry.message);
    }

    let config = RunnerConfig {
        initial_delay: Duration::from_secs(5),
        ..RunnerConfig::default()
    };
    let mut runner = JobRunner::with_config(job, config);
    match runner.run_with_timeout(None, Duration::from_secs(600)).await {
        Ok(report) => println!("\nDone after {} polls: {:?}", report.polls, report.downloaded),
        Err(SdkError::JobFailed { job_id }) => eprintln!("\nJob {} failed", job_id),
        Err(e) => eprintln!("\nError: {}", e),
    }

    Ok(())
}
