//! `notevault audit` — display your audit trail.
//!
//! Usage:
//!   notevault audit               # show last 50 entries
//!   notevault audit --last 20     # show last 20
//!   notevault audit --since 7d    # entries from last 7 days

use chrono::{DateTime, Duration, Utc};

use crate::audit::AuditEntry;
use crate::cli::output;
use crate::cli::{App, Cli};
use crate::errors::{NoteVaultError, Result};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let since_dt = match since {
        Some(s) => Some(parse_since(s)?),
        None => None,
    };

    let app = App::open(cli)?;
    let user = app.authenticate(cli)?;

    let audit = app
        .audit_log()
        .ok_or_else(|| NoteVaultError::AuditError("failed to open audit database".into()))?;

    let entries = audit.query(&user.id, last, since_dt)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);

    Ok(())
}

/// Turn a look-back window like "7d", "24h" or "30m" into a cutoff time.
fn parse_since(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        NoteVaultError::Validation(format!(
            "invalid duration '{input}' (expected e.g. 7d, 24h or 30m)"
        ))
    };

    let split = input
        .len()
        .checked_sub(1)
        .filter(|&i| input.is_char_boundary(i))
        .ok_or_else(invalid)?;
    let (amount, unit) = input.split_at(split);
    let amount: u32 = amount.parse().map_err(|_| invalid())?;

    let window = match unit {
        "d" => Duration::days(amount.into()),
        "h" => Duration::hours(amount.into()),
        "m" => Duration::minutes(amount.into()),
        _ => return Err(invalid()),
    };

    Utc::now().checked_sub_signed(window).ok_or_else(invalid)
}

/// Print audit entries in a formatted table.
pub fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};
    use console::style;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Action", "Details", "Origin", "Client"]);

    for entry in entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let action = colorize_action(&entry.action);
        let details = entry.details.as_deref().unwrap_or("-");
        let origin = entry.origin.as_deref().unwrap_or("-");
        let client = entry.client.as_deref().unwrap_or("-");

        table.add_row(vec![
            time,
            action,
            details.to_string(),
            origin.to_string(),
            client.to_string(),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

/// Colorize action names for display.
fn colorize_action(action: &str) -> String {
    use console::style;

    match action {
        "REGISTER" | "CREATE_ENTRY" => style(action).green().to_string(),
        "UPDATE_ENTRY" => style(action).blue().to_string(),
        "DELETE_ENTRY" => style(action).red().to_string(),
        "VIEW_ENTRY" => style(action).cyan().to_string(),
        "LOGIN" | "LOGOUT" => style(action).magenta().to_string(),
        _ => action.to_string(),
    }
}
