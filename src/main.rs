use clap::Parser;
use kgrid_node::adapter::inbound::cli::{self, command::Cli};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        error!(error = %e, "Fatal error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    info!("kgrid-node stopped");
}
