//! # EO Canvas Rust SDK
//!
//! This crate provides a Rust client for the EO Canvas serverless functions
//! API: submit processing jobs (SNAP graphs, Data Tailor chains, parametric
//! processes), follow them to completion and download their results.
//!
//! ## Features
//!
//! - **Authenticated session**: OAuth bearer tokens, refreshed transparently
//! - **Processes**: typed SNAP, Data Tailor and ShearWater inputs
//! - **Jobs**: status polling with exponential backoff, logs and downloads
//! - **Keys**: storage credentials encrypted with the service public key
//! - **Retry Logic**: idempotent requests are retried on server errors
//!
//! ## Quick Start
//!
//! ### Running a SNAP graph
//!
//! ```rust,no_run
//! use eocanvas_rust_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Api::from_env()?;
//!
//!     let graph = Graph::from_file("graph.xml")?;
//!     let inputs = SnapInputs::new(graph)
//!         .with_input(Input::new("img1", "https://example.com/S1A.zip"));
//!
//!     let report = Process::snap(inputs).run(&api, None, None).await?;
//!     println!("Downloaded: {:?}", report.downloaded);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Registering a storage key
//!
//! ```rust,no_run
//! use eocanvas_rust_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Api::from_env()?;
//!
//!     let config = WebDavKeyConfig::new("https://dav.example.com", "user", "secret")?;
//!     let key = Key::with_config(&api, "mydav", config).create().await?;
//!     println!("Created {}", key.uri());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod job;
pub mod keystore;
pub mod logging;
pub mod process;

pub use api::Api;
pub use auth::Credentials;
pub use error::{Result, SdkError};
pub use job::{Job, JobRunner, JobStatus};
pub use keystore::Key;
pub use process::Process;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{Api, RetryClient};
    pub use crate::auth::Credentials;
    pub use crate::config::Urls;
    pub use crate::error::{Result, SdkError};
    pub use crate::job::{Job, JobResult, JobRunner, JobStatus, RunReport, RunnerConfig};
    pub use crate::keystore::{Key, KeyConfig, KeyType, S3KeyConfig, WebDavKeyConfig};
    pub use crate::process::{
        Chain, Config, ConfigOption, DataTailorInputs, Graph, Input, Process, SnapInputs,
    };
}
