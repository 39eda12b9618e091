//! `notevault logout` — record a logout.
//!
//! The CLI keeps no session, so this only authenticates and leaves a
//! LOGOUT event in the audit trail.

use crate::cli::output;
use crate::cli::{App, Cli};
use crate::errors::Result;

/// Execute the `logout` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let app = App::open(cli)?;
    let user = app.authenticate(cli)?;

    app.accounts()?.logout(&user, &app.request_context());

    output::success(&format!("Logged out {}", user.email));
    Ok(())
}
