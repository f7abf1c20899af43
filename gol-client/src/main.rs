use clap::Parser;

use gol_client::cli::Cli;
use gol_client::run::run;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::error!(%err, "run failed");
        std::process::exit(1);
    }
}
