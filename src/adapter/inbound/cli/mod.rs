//! CLI module graph.

pub mod command;
pub mod hash;
pub mod records;
pub mod run;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use command::{Cli, Commands};

/// Resolve configuration and run the selected command.
///
/// # Errors
///
/// Returns configuration errors and whatever the command reports.
pub async fn execute(cli: Cli) -> Result<()> {
    if let Some(Commands::Hash(args)) = &cli.command {
        return hash::execute(args);
    }

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(shelf) = cli.shelf {
        config.shelf.path = shelf;
    }
    config.init_logging();

    match cli.command {
        None | Some(Commands::Run) => run::execute(&config).await,
        Some(Commands::Records(args)) => records::execute(&config, &args).await,
        Some(Commands::Hash(_)) => Ok(()),
    }
}
