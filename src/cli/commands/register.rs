//! `notevault register` — create a new account.

use crate::cli::output;
use crate::cli::{prompt_new_password, resolve_email, App, Cli};
use crate::errors::Result;

/// Execute the `register` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let app = App::open(cli)?;
    let email = resolve_email(cli)?;
    let password = prompt_new_password()?;

    let user = app
        .accounts()?
        .register(&email, &password, &app.request_context())?;

    output::success(&format!("Registered {}", user.email));
    output::tip("Add an entry: notevault add --title <TITLE>");

    Ok(())
}
