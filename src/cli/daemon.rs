// CLI daemon commands: start, health

use std::path::PathBuf;

use reqwest::Client;
use serde_json::Value;

use super::{base_url, handle_request_error};
use crate::daemon::{self, StartOptions};

/// logslice start
pub async fn cmd_start(
    host: Option<String>,
    port: Option<u16>,
    config: Option<PathBuf>,
    logs_dir: Option<PathBuf>,
    delay_ms: Option<u64>,
    verbose: bool,
) -> anyhow::Result<()> {
    daemon::start_daemon(StartOptions {
        config_path: config,
        logs_dir,
        host,
        port,
        worker_delay_ms: delay_ms,
        verbose,
    })
    .await
}

/// logslice health
pub async fn cmd_health(host: &str, port: u16) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/health", base_url(host, port));

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    let body: Value = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))?;

    println!("Daemon is running.");
    println!("  Version:     {}", body["version"].as_str().unwrap_or("unknown"));
    println!("  Uptime:      {}s", body["uptime_seconds"].as_u64().unwrap_or(0));
    println!("  Logs dir:    {}", body["logs_dir"].as_str().unwrap_or("unknown"));
    println!(
        "  Jobs:        {} tracked, {} in progress",
        body["jobs_tracked"].as_u64().unwrap_or(0),
        body["jobs_in_progress"].as_u64().unwrap_or(0)
    );

    Ok(())
}
