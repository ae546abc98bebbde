//! Handler for the `records` command.

use std::io::ErrorKind;

use crate::adapter::inbound::cli::command::RecordsArgs;
use crate::adapter::outbound::shelf::FsShelf;
use crate::domain::record::{ActivationRecord, Snapshot};
use crate::error::{PersistenceError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::shelf::ShelfStore;

/// Print the records on the configured shelf. A shelf that was never
/// created has no records.
pub async fn execute(config: &Config, args: &RecordsArgs) -> Result<()> {
    let shelf = FsShelf::new(&config.shelf.path);
    let snapshot = match shelf.load().await {
        Ok(snapshot) => snapshot,
        Err(PersistenceError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
            Snapshot::new()
        }
        Err(e) => return Err(e.into()),
    };
    let records: Vec<&ActivationRecord> = snapshot.records().collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records on shelf {}", config.shelf.path.display());
        return Ok(());
    }
    for record in records {
        println!(
            "{:<11} {:<8} {} {}",
            record.status, record.source.kind, record.id, record.uri
        );
    }
    Ok(())
}
