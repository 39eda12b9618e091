//! `notevault delete` — permanently remove an entry.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{App, Cli};
use crate::errors::{NoteVaultError, Result};
use crate::vault::EntryId;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let app = App::open(cli)?;
    let vault = app.vault()?;
    let id: EntryId = id.parse()?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry {id}? This cannot be undone"))
            .default(false)
            .interact()
            .map_err(|e| NoteVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let user = app.authenticate(cli)?;
    vault.delete(&user.identity(), &app.request_context(), &id)?;

    output::success(&format!("Deleted entry {id}"));
    Ok(())
}
