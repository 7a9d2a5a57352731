//! Key management: register WebDAV credentials, list keys, delete the key

use anyhow::Context;
use eocanvas_rust_sdk::prelude::*;

fn env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{} must be set", name))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let api = Api::from_env().context("loading credentials from .hdarc")?;

    println!("=== Keys ===");
    for key in api.get_keys().await? {
        println!(
            "   {} ({}) owner={}",
            key.name,
            key.type_().map(|t| t.to_string()).unwrap_or_default(),
            key.owner.as_deref().unwrap_or("-")
        );
    }

    let config = WebDavKeyConfig::new(
        env("WEBDAV_ENDPOINT")?,
        env("WEBDAV_USERNAME")?,
        env("WEBDAV_PASSWORD")?,
    )?;

    let key = Key::with_config(&api, "demo_webdav", config)
        .description("Demo WebDAV share")
        .expire_seconds(600)
        .create()
        .await?;
    println!("\nCreated {}", key.uri());

    // A process writing its outputs to the share
    let process = Process::shearwater("Sindian", "2024-04-20", "2024-04-21")?.with_output(&key.name);
    println!("Output target: {}", serde_json::to_string(&process.prepare_inputs()?.outputs)?);

    key.delete().await?;
    println!("Deleted {}", key.name);

    Ok(())
}
