//! `notevault add` — encrypt and store a new entry.
//!
//! Content comes from the command line, piped stdin, or a hidden prompt,
//! in that order.

use crate::cli::output;
use crate::cli::{read_content, App, Cli};
use crate::errors::Result;
use crate::vault::NewEntry;

/// Execute the `add` command.
pub fn execute(cli: &Cli, title: &str, category: &str, content: Option<&str>) -> Result<()> {
    let app = App::open(cli)?;
    let vault = app.vault()?;

    let content = read_content(content, &format!("Content for '{title}'"))?;
    // Validate before asking for the password.
    let input = NewEntry::new(title, category, &content)?;

    let user = app.authenticate(cli)?;
    let created = vault.create(&user.identity(), &app.request_context(), input)?;

    output::success(&format!(
        "Added {} entry '{}' ({})",
        created.category, created.title, created.id
    ));
    output::tip(&format!("View it: notevault show {}", created.id));

    Ok(())
}
