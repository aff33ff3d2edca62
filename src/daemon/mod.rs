// Daemon module: bootstrap, config resolution, and the extraction job lifecycle.

pub mod events;
pub mod executor;
pub mod extraction;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::daemon::events::JobEvent;
use crate::daemon::extraction::ExtractionService;
use crate::models::{ServiceConfig, SystemClock};
use crate::server::{self, AppState};
use crate::storage::logs::{FsArtifactStore, SOURCE_LOG_NAME};
use crate::storage::ArtifactStore;

/// Timestamp prefix of every daemon log line. Starts with `YYYY-MM-DD` so the
/// daemon's own output can be sliced by date like any other source log.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

fn read_config(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ServiceConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    validate_config(&config)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

fn validate_config(config: &ServiceConfig) -> Result<()> {
    anyhow::ensure!(
        config.event_capacity > 0,
        "event_capacity must be greater than 0"
    );
    Ok(())
}

/// Load the ServiceConfig using this resolution order:
///   1. --config CLI flag (passed as config_path)
///   2. LOGSLICE_CONFIG_DIR environment variable
///   3. Platform config dir (dirs::config_dir()/logslice/config.json)
///   4. If no config file exists, use ServiceConfig::default()
pub fn load_config(config_path: Option<&Path>) -> Result<ServiceConfig> {
    if let Some(path) = config_path {
        if path.exists() {
            return read_config(path);
        }
        return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
    }

    if let Ok(config_dir) = std::env::var("LOGSLICE_CONFIG_DIR") {
        let path = PathBuf::from(config_dir).join("config.json");
        if path.exists() {
            return read_config(&path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("logslice").join("config.json");
        if path.exists() {
            return read_config(&path);
        }
    }

    Ok(ServiceConfig::default())
}

/// Resolve the logs directory: explicit override, then config, then the
/// `LOGSLICE_LOGS_DIR` env var, then the platform data dir.
pub fn resolve_logs_dir(override_dir: Option<&Path>, config: &ServiceConfig) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Some(ref dir) = config.logs_dir {
        return dir.clone();
    }
    if let Ok(dir) = std::env::var("LOGSLICE_LOGS_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logslice")
        .join("logs")
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Install the global subscriber: console output always, plus an append-only
/// copy in `<file_dir>/application.log` when `file_dir` is given.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the daemon.
pub fn init_tracing(file_dir: Option<&Path>, default_filter: &str) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let console = tracing_subscriber::fmt::layer()
        .with_timer(ChronoLocal::new(LOG_TIMESTAMP_FORMAT.to_string()));

    match file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, SOURCE_LOG_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_timer(ChronoLocal::new(LOG_TIMESTAMP_FORMAT.to_string()))
                .with_ansi(false)
                .with_writer(writer);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init();
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Daemon bootstrap
// ---------------------------------------------------------------------------

/// Overrides supplied on the command line for `logslice start`.
#[derive(Debug, Default, Clone)]
pub struct StartOptions {
    pub config_path: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub worker_delay_ms: Option<u64>,
    pub verbose: bool,
}

/// Apply command-line overrides. Fields left `None` keep the config value.
fn apply_overrides(config: &mut ServiceConfig, opts: &StartOptions) {
    if let Some(ref h) = opts.host {
        config.host = h.clone();
    }
    if let Some(p) = opts.port {
        config.port = p;
    }
    if let Some(d) = opts.worker_delay_ms {
        config.worker_delay_ms = d;
    }
}

/// Start the daemon and run until Ctrl+C or SIGTERM.
///
/// 1. Loads config and applies CLI overrides
/// 2. Creates the logs directory and installs tracing
/// 3. Builds the extraction service and HTTP router
/// 4. Serves until a shutdown signal arrives
///
/// Extractions still running at shutdown are abandoned; their jobs are lost
/// with the rest of the in-memory registry.
pub async fn start_daemon(opts: StartOptions) -> Result<()> {
    let mut config = load_config(opts.config_path.as_deref())?;
    apply_overrides(&mut config, &opts);

    let logs_dir = resolve_logs_dir(opts.logs_dir.as_deref(), &config);
    config.logs_dir = Some(logs_dir.clone());

    let store = FsArtifactStore::new(logs_dir.clone()).await?;

    let default_filter = if opts.verbose { "debug" } else { "info" };
    let _log_guard = init_tracing(
        config.service_log_to_file.then_some(logs_dir.as_path()),
        default_filter,
    );
    tracing::info!(
        "Logs directory: {} (worker delay {} ms)",
        logs_dir.display(),
        config.worker_delay_ms
    );

    let config = Arc::new(config);
    let (event_tx, _) = broadcast::channel::<JobEvent>(config.event_capacity);
    let service = Arc::new(ExtractionService::new(
        Arc::new(store) as Arc<dyn ArtifactStore>,
        Arc::new(SystemClock),
        event_tx,
        Duration::from_millis(config.worker_delay_ms),
    ));

    let state = Arc::new(AppState {
        service: Arc::clone(&service),
        config: Arc::clone(&config),
        start_time: Instant::now(),
    });

    let router = server::create_router(state);
    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("Failed to bind to {}", bind_addr))?;

    tracing::info!("Daemon started. Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    let abandoned = service.registry().in_progress();
    if abandoned > 0 {
        tracing::warn!(
            "{} extraction job(s) still in progress at shutdown",
            abandoned
        );
    }
    tracing::info!("Daemon exited cleanly.");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received Ctrl+C signal");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM signal");
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Received Ctrl+C signal");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received Ctrl+C signal");
    }
}
