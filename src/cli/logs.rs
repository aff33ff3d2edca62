// CLI extraction commands: extract, status, fetch, full

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::Value;

use super::{base_url, handle_request_error};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pull the `message` out of a JSON error body, falling back to the HTTP status.
async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => body["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status)),
        Err(_) => format!("HTTP {}", status),
    }
}

/// Write `bytes` to `output`, or to stdout when no path is given.
fn emit(bytes: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

async fn fetch_status(client: &Client, host: &str, port: u16, id: u64) -> anyhow::Result<String> {
    let url = format!("{}/api/logs/status/{}", base_url(host, port), id);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    if !response.status().is_success() {
        anyhow::bail!("{}", error_message(response).await);
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))?;
    Ok(body["status"].as_str().unwrap_or("UNKNOWN").to_string())
}

/// logslice extract
pub async fn cmd_extract(host: &str, port: u16, date: &str, wait: bool) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/api/logs/create", base_url(host, port));

    let response = client
        .post(&url)
        .query(&[("date", date)])
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    if !response.status().is_success() {
        anyhow::bail!("{}", error_message(response).await);
    }

    let id: u64 = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))?;

    if !wait {
        println!("{}", id);
        return Ok(());
    }

    eprintln!("Extraction {} submitted for {}, waiting...", id, date);
    loop {
        match fetch_status(&client, host, port, id).await?.as_str() {
            "IN_PROGRESS" => tokio::time::sleep(POLL_INTERVAL).await,
            "COMPLETED" => {
                eprintln!("Extraction {} completed.", id);
                return cmd_fetch(host, port, id, None).await;
            }
            "FAILED" => anyhow::bail!("Extraction {} failed", id),
            other => anyhow::bail!("Extraction {} has unexpected status {}", id, other),
        }
    }
}

/// logslice status
pub async fn cmd_status(host: &str, port: u16, id: u64) -> anyhow::Result<()> {
    let client = Client::new();
    let status = fetch_status(&client, host, port, id).await?;
    println!("{}", status);
    Ok(())
}

/// logslice fetch
pub async fn cmd_fetch(
    host: &str,
    port: u16,
    id: u64,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/api/logs/file/{}", base_url(host, port), id);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    if !response.status().is_success() {
        anyhow::bail!("{}", error_message(response).await);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response: {}", e))?;
    emit(&bytes, output)
}

/// logslice full
pub async fn cmd_full(host: &str, port: u16, output: Option<&Path>) -> anyhow::Result<()> {
    let client = Client::new();
    let url = format!("{}/api/logs/full", base_url(host, port));

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| handle_request_error(e, host, port))?;

    if !response.status().is_success() {
        anyhow::bail!("{}", error_message(response).await);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response: {}", e))?;
    emit(&bytes, output)
}
