//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod context;
pub mod output;

use clap::Parser;

use zeroize::Zeroizing;

use crate::accounts::MIN_PASSWORD_LEN;
use crate::errors::{NoteVaultError, Result};

pub use context::App;

/// NoteVault CLI: per-user encrypted notes and secrets.
#[derive(Parser)]
#[command(
    name = "notevault",
    about = "Encrypted personal note and secret store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Account email (prompted for if omitted)
    #[arg(short, long, env = "NOTEVAULT_EMAIL", global = true)]
    pub email: Option<String>,

    /// Data directory (default: from .notevault.toml, else .notevault)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new account
    Register,

    /// Check credentials and record a login
    Login,

    /// Record a logout
    Logout,

    /// Show the account profile
    Whoami,

    /// Add a new entry
    Add {
        /// Entry title
        #[arg(short, long)]
        title: String,

        /// Category: note, password or secret
        #[arg(short, long, default_value = "note")]
        category: String,

        /// Entry content (omit for stdin or interactive prompt)
        content: Option<String>,
    },

    /// Decrypt and show an entry
    Show {
        /// Entry id
        id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change an entry (only the given fields are modified)
    Update {
        /// Entry id
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New category: note, password or secret
        #[arg(short, long)]
        category: Option<String>,

        /// Mark or unmark as favorite
        #[arg(long)]
        favorite: Option<bool>,

        /// New content
        #[arg(long, conflicts_with = "read_content")]
        content: Option<String>,

        /// Read new content from stdin or an interactive prompt
        #[arg(long)]
        read_content: bool,
    },

    /// Permanently delete an entry
    Delete {
        /// Entry id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List entries (favorites first, newest first)
    List {
        /// Case-insensitive title search
        #[arg(short, long)]
        search: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only favorites
        #[arg(long)]
        favorites: bool,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Entries per page (default from config)
        #[arg(long)]
        page_size: Option<u32>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// View your audit trail
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the account email from `--email` / `NOTEVAULT_EMAIL`, or prompt.
pub fn resolve_email(cli: &Cli) -> Result<String> {
    if let Some(ref email) = cli.email {
        if !email.trim().is_empty() {
            return Ok(email.clone());
        }
    }

    dialoguer::Input::<String>::new()
        .with_prompt("Email")
        .interact_text()
        .map_err(|e| NoteVaultError::CommandFailed(format!("email prompt: {e}")))
}

/// Get the account password, trying in order:
/// 1. `NOTEVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("NOTEVAULT_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| NoteVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used during `register`).
///
/// Also respects `NOTEVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("NOTEVAULT_PASSWORD") {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(NoteVaultError::Validation(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose password")
            .with_confirmation("Confirm password", "Passwords do not match, try again")
            .interact()
            .map_err(|e| NoteVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read entry content from an inline value, piped stdin, or a hidden prompt.
pub fn read_content(inline: Option<&str>, prompt: &str) -> Result<Zeroizing<String>> {
    use std::io::{self, IsTerminal, Read};

    if let Some(v) = inline {
        output::warning("Content provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        return Ok(buf);
    }

    let value = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| NoteVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}
