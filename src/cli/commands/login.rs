//! `notevault login` — verify credentials and record a login.

use crate::cli::output;
use crate::cli::{prompt_password, resolve_email, App, Cli};
use crate::errors::Result;

/// Execute the `login` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let app = App::open(cli)?;
    let email = resolve_email(cli)?;
    let password = prompt_password()?;

    let user = app
        .accounts()?
        .login(&email, &password, &app.request_context())?;

    output::success(&format!("Logged in as {}", user.email));
    Ok(())
}
