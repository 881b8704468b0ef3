use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartfin::api::{Cli, run_cli};

#[tokio::main]
async fn main() {
    // stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartfin=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run_cli(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
