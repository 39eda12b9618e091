use clap::Parser;
use tracing_subscriber::EnvFilter;

use notevault::cli::commands::{list::ListArgs, update::UpdateArgs};
use notevault::cli::{Cli, Commands};
use notevault::errors::{ErrorKind, NoteVaultError};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "NOTEVAULT_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Register => notevault::cli::commands::register::execute(&cli),
        Commands::Login => notevault::cli::commands::login::execute(&cli),
        Commands::Logout => notevault::cli::commands::logout::execute(&cli),
        Commands::Whoami => notevault::cli::commands::whoami::execute(&cli),
        Commands::Add {
            ref title,
            ref category,
            ref content,
        } => notevault::cli::commands::add::execute(&cli, title, category, content.as_deref()),
        Commands::Show { ref id, json } => notevault::cli::commands::show::execute(&cli, id, json),
        Commands::Update {
            ref id,
            ref title,
            ref category,
            favorite,
            ref content,
            read_content,
        } => notevault::cli::commands::update::execute(
            &cli,
            id,
            UpdateArgs {
                title: title.as_deref(),
                category: category.as_deref(),
                favorite,
                content: content.as_deref(),
                read_content,
            },
        ),
        Commands::Delete { ref id, force } => {
            notevault::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::List {
            ref search,
            ref category,
            favorites,
            page,
            page_size,
            json,
        } => notevault::cli::commands::list::execute(
            &cli,
            ListArgs {
                search: search.as_deref(),
                category: category.as_deref(),
                favorites,
                page,
                page_size,
                json,
            },
        ),
        Commands::Audit { last, ref since } => {
            notevault::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

/// Log to stderr. `NOTEVAULT_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "notevault=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Print an error for the user. Internal failures other than configuration
/// problems are reported generically; the detail goes to the debug log.
fn report(e: &NoteVaultError) {
    match (e.kind(), e) {
        (ErrorKind::Internal, NoteVaultError::ConfigError(_)) => {
            notevault::cli::output::error(&e.to_string());
        }
        (ErrorKind::Internal, _) => {
            tracing::debug!(error = %e, "internal error");
            notevault::cli::output::error("Internal error (run with --verbose for details)");
        }
        _ => notevault::cli::output::error(&e.to_string()),
    }
}
