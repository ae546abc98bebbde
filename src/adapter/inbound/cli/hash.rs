//! Handler for the `hash` command.

use crate::adapter::inbound::cli::command::HashArgs;
use crate::domain::id::ObjectId;
use crate::error::Result;

/// Print the identifier for `args.uri`.
pub fn execute(args: &HashArgs) -> Result<()> {
    let id = ObjectId::for_uri(&args.uri)?;
    println!("{id}");
    Ok(())
}
