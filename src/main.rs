use clap::Parser;

use logslice::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The daemon installs its own subscriber (console + application.log)
    if cli.verbose && !cli.is_daemon() {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    }

    if let Err(e) = cli::dispatch(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
