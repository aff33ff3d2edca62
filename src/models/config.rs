use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs_dir: Option<PathBuf>,
    /// Pause before an extraction worker starts reading the source log.
    #[serde(default = "default_worker_delay_ms")]
    pub worker_delay_ms: u64,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Append the daemon's own tracing output to `application.log`.
    #[serde(default = "default_service_log_to_file")]
    pub service_log_to_file: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8378
}

fn default_worker_delay_ms() -> u64 {
    10_000
}

fn default_event_capacity() -> usize {
    1024
}

fn default_service_log_to_file() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs_dir: None,
            worker_delay_ms: default_worker_delay_ms(),
            event_capacity: default_event_capacity(),
            service_log_to_file: default_service_log_to_file(),
        }
    }
}
