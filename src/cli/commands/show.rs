//! `notevault show` — decrypt and print one entry.

use crate::cli::output;
use crate::cli::{App, Cli};
use crate::errors::{NoteVaultError, Result};
use crate::vault::EntryId;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str, json: bool) -> Result<()> {
    let app = App::open(cli)?;
    let vault = app.vault()?;
    let id: EntryId = id.parse()?;

    let user = app.authenticate(cli)?;
    let view = vault.get(&user.identity(), &app.request_context(), &id)?;

    if json {
        let rendered = serde_json::to_string_pretty(&view)
            .map_err(|e| NoteVaultError::SerializationError(e.to_string()))?;
        println!("{rendered}");
    } else {
        output::print_entry(&view);
    }

    Ok(())
}
