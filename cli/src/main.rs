//! `volunteers` entry point.

use clap::Parser;
use volunteer_cli::Cli;

fn main() {
    std::process::exit(run_cli());
}

#[tokio::main]
async fn run_cli() -> i32 {
    // Logs go to stderr so command output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "volunteers v{}", env!("CARGO_PKG_VERSION"));
    volunteer_cli::run(cli).await
}
