//! `notevault list` — one page of entry metadata, never any content.

use crate::cli::output;
use crate::cli::{App, Cli};
use crate::errors::{NoteVaultError, Result};
use crate::vault::{Category, EntryQuery};

/// Filters and paging supplied on the command line for `list`.
pub struct ListArgs<'a> {
    pub search: Option<&'a str>,
    pub category: Option<&'a str>,
    pub favorites: bool,
    pub page: u32,
    pub page_size: Option<u32>,
    pub json: bool,
}

/// Execute the `list` command.
pub fn execute(cli: &Cli, args: ListArgs<'_>) -> Result<()> {
    let app = App::open(cli)?;
    let vault = app.vault()?;

    let mut query = EntryQuery::new()
        .favorites_only(args.favorites)
        .page(args.page)
        .page_size(args.page_size.unwrap_or(app.settings.default_page_size));
    if let Some(search) = args.search {
        query = query.search(search);
    }
    if let Some(category) = args.category {
        query = query.category(category.parse::<Category>()?);
    }

    let user = app.authenticate(cli)?;
    let page = vault.list(&user.identity(), &query)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&page)
            .map_err(|e| NoteVaultError::SerializationError(e.to_string()))?;
        println!("{rendered}");
    } else {
        output::print_entries_table(&page);
    }

    Ok(())
}
