//! `notevault whoami` — show the account profile.

use console::style;

use crate::cli::{App, Cli};
use crate::errors::{NoteVaultError, Result};

/// Execute the `whoami` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let app = App::open(cli)?;
    let user = app.authenticate(cli)?;

    // Re-read so the output reflects what is stored, not what we verified against.
    let profile = app
        .accounts()?
        .profile(&user.id)?
        .ok_or(NoteVaultError::InvalidCredentials)?;

    let last_login = profile
        .last_login_at
        .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());

    println!("{}  {}", style("email").dim(), profile.email);
    println!("{}  {}", style("id").dim(), profile.id);
    println!(
        "{}  {}",
        style("registered").dim(),
        profile.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}  {}", style("last login").dim(), last_login);

    Ok(())
}
