//! `notevault update` — change some fields of an entry.

use crate::cli::output;
use crate::cli::{read_content, App, Cli};
use crate::errors::Result;
use crate::vault::{EntryId, EntryPatch};

/// Fields supplied on the command line for `update`.
pub struct UpdateArgs<'a> {
    pub title: Option<&'a str>,
    pub category: Option<&'a str>,
    pub favorite: Option<bool>,
    pub content: Option<&'a str>,
    pub read_content: bool,
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, id: &str, args: UpdateArgs<'_>) -> Result<()> {
    let app = App::open(cli)?;
    let vault = app.vault()?;
    let id: EntryId = id.parse()?;

    let mut patch = EntryPatch::new();
    if let Some(title) = args.title {
        patch = patch.title(title)?;
    }
    if let Some(category) = args.category {
        patch = patch.category(category)?;
    }
    if let Some(favorite) = args.favorite {
        patch = patch.favorite(favorite);
    }
    if args.content.is_some() || args.read_content {
        let content = read_content(args.content, "New content")?;
        patch = patch.content(&content)?;
    }

    let user = app.authenticate(cli)?;
    let updated = vault.update(&user.identity(), &app.request_context(), &id, patch)?;

    output::success(&format!(
        "Updated {} entry '{}'",
        updated.category, updated.title
    ));
    Ok(())
}
