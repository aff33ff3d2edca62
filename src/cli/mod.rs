pub mod daemon;
pub mod logs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8378;

/// logslice - Extract a single day's lines from an application log
#[derive(Parser, Debug)]
#[command(
    name = "logslice",
    version,
    about = "logslice - Extract a single day's lines from an application log"
)]
pub struct Cli {
    /// Daemon host [default: 127.0.0.1; for `start`, the config value]
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Daemon port [default: 8378; for `start`, the config value]
    #[arg(short = 'p', long, global = true)]
    pub port: Option<u16>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// True when this invocation runs the daemon in-process.
    pub fn is_daemon(&self) -> bool {
        matches!(self.command, Some(Commands::Start { .. }))
    }

    /// Host a client command talks to.
    pub fn daemon_host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Port a client command talks to.
    pub fn daemon_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the daemon in the foreground
    Start {
        /// Path to configuration file
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Directory holding application.log and the extracted files
        #[arg(long = "logs-dir")]
        logs_dir: Option<PathBuf>,

        /// Delay before each extraction starts, in milliseconds
        #[arg(long = "delay-ms")]
        delay_ms: Option<u64>,
    },

    /// Show daemon health
    Health,

    /// Request the log lines of one day (DD-MM-YYYY)
    Extract {
        /// Date in DD-MM-YYYY format
        date: String,

        /// Wait for the extraction to finish and print the result
        #[arg(short, long)]
        wait: bool,
    },

    /// Show the status of an extraction job
    Status {
        /// Job ID
        id: u64,
    },

    /// Print or save the result of a completed extraction
    Fetch {
        /// Job ID
        id: u64,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print or save the full live log
    Full {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Build the base URL for the daemon HTTP API.
pub fn base_url(host: &str, port: u16) -> String {
    format!("http://{}:{}", host, port)
}

/// Format a connection error message for when the daemon is not reachable.
pub fn connection_error_message(host: &str, port: u16) -> String {
    format!(
        "Could not connect to daemon at {}:{}. Is it running? (try: logslice start)",
        host, port
    )
}

/// Helper to handle reqwest errors and produce a user-friendly connection error.
pub(crate) fn handle_request_error(err: reqwest::Error, host: &str, port: u16) -> anyhow::Error {
    if err.is_connect() || err.is_timeout() {
        anyhow::anyhow!("{}", connection_error_message(host, port))
    } else {
        anyhow::anyhow!("Request failed: {}", err)
    }
}

/// Dispatch the CLI command to the appropriate handler.
pub async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Start {
            config,
            logs_dir,
            delay_ms,
        }) => {
            // Only explicit flags override the config file
            daemon::cmd_start(
                cli.host.clone(),
                cli.port,
                config.clone(),
                logs_dir.clone(),
                *delay_ms,
                cli.verbose,
            )
            .await
        }
        Some(Commands::Health) => daemon::cmd_health(cli.daemon_host(), cli.daemon_port()).await,
        Some(Commands::Extract { date, wait }) => {
            logs::cmd_extract(cli.daemon_host(), cli.daemon_port(), date, *wait).await
        }
        Some(Commands::Status { id }) => {
            logs::cmd_status(cli.daemon_host(), cli.daemon_port(), *id).await
        }
        Some(Commands::Fetch { id, output }) => {
            logs::cmd_fetch(cli.daemon_host(), cli.daemon_port(), *id, output.as_deref()).await
        }
        Some(Commands::Full { output }) => {
            logs::cmd_full(cli.daemon_host(), cli.daemon_port(), output.as_deref()).await
        }
        None => {
            // No subcommand provided -- print help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
