//! Session and transport for the serverless functions API

mod client;
mod retry_client;

pub use client::Api;
pub use retry_client::{Body, RetryClient};
