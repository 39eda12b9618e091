//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{EntryMetadata, EntryPage, EntryView};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print one page of entry metadata as a table, followed by the page footer.
pub fn print_entries_table(page: &EntryPage) {
    if page.total_count == 0 {
        info("No entries match.");
        tip("Run `notevault add --title <TITLE>` to add your first entry.");
        return;
    }

    if page.entries.is_empty() {
        info(&format!(
            "Page {} is past the end ({} pages).",
            page.current_page, page.total_pages
        ));
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Id", "Title", "Category", "Created", "Updated"]);

    for e in &page.entries {
        table.add_row(vec![
            favorite_marker(e),
            e.id.to_string(),
            e.title.clone(),
            e.category.to_string(),
            e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            e.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
    println!(
        "{}",
        style(format!(
            "Page {} of {} ({} entries)",
            page.current_page, page.total_pages, page.total_count
        ))
        .dim()
    );
}

/// Print a decrypted entry.
pub fn print_entry(view: &EntryView) {
    let m = &view.metadata;
    println!("{} {}", style(&m.title).bold(), favorite_marker(m));
    println!("{}  {}", style("id").dim(), m.id);
    println!("{}  {}", style("category").dim(), m.category);
    println!(
        "{}  {}",
        style("created").dim(),
        m.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "{}  {}",
        style("updated").dim(),
        m.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
    println!("{}", view.content.as_str());
}

fn favorite_marker(e: &EntryMetadata) -> String {
    if e.is_favorite {
        style("\u{2605}").yellow().to_string()
    } else {
        String::new()
    }
}
