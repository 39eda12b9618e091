//! Per-invocation wiring: settings, databases and services.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::accounts::{Accounts, User};
use crate::audit::AuditLog;
use crate::cli::{prompt_password, resolve_email, Cli};
use crate::config::{ServerSecret, Settings};
use crate::crypto::KeyDeriver;
use crate::db::Database;
use crate::errors::Result;
use crate::identity::RequestContext;
use crate::vault::{SqliteEntryRepository, VaultEntryStore};

/// Audit sink shared by every service of one invocation.
///
/// `None` means the audit database could not be opened; operations still
/// succeed, they are just not recorded.
pub type SharedAudit = Arc<Option<AuditLog>>;

/// The vault store as the CLI builds it.
pub type CliVault = VaultEntryStore<SqliteEntryRepository, SharedAudit>;

/// Everything a command needs, opened once per invocation.
pub struct App {
    pub settings: Settings,
    pub data_dir: PathBuf,
    db: Database,
    audit: SharedAudit,
}

impl App {
    /// Load settings from the current directory and open the databases.
    pub fn open(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let settings = Settings::load(&cwd)?;

        let data_dir = match cli.data_dir {
            Some(ref dir) => cwd.join(dir),
            None => settings.data_path(&cwd),
        };
        debug!(data_dir = %data_dir.display(), "opening data directory");

        let db = Database::open(&data_dir)?;
        let audit = Arc::new(AuditLog::open(&data_dir));

        Ok(Self {
            settings,
            data_dir,
            db,
            audit,
        })
    }

    /// The account service.
    pub fn accounts(&self) -> Result<Accounts<SharedAudit>> {
        Accounts::new(
            self.db.clone(),
            self.settings.argon2_params(),
            Arc::clone(&self.audit),
        )
    }

    /// The vault store. Needs the server secret in the environment.
    pub fn vault(&self) -> Result<CliVault> {
        let secret = ServerSecret::from_env()?;
        let deriver = KeyDeriver::new(secret, self.settings.argon2_params())?;
        Ok(VaultEntryStore::new(
            deriver,
            SqliteEntryRepository::new(self.db.clone()),
            Arc::clone(&self.audit),
        )
        .with_max_page_size(self.settings.max_page_size))
    }

    /// The audit log, if it could be opened.
    pub fn audit_log(&self) -> Option<&AuditLog> {
        self.audit.as_ref().as_ref()
    }

    /// Resolve the email, prompt for the password and verify both.
    pub fn authenticate(&self, cli: &Cli) -> Result<User> {
        let email = resolve_email(cli)?;
        let password = prompt_password()?;
        self.accounts()?.authenticate(&email, &password)
    }

    /// Provenance attached to audit events from this process.
    pub fn request_context(&self) -> RequestContext {
        request_context()
    }
}

/// Provenance for CLI-originated events.
pub fn request_context() -> RequestContext {
    RequestContext::new(
        "local",
        format!("notevault-cli/{}", env!("CARGO_PKG_VERSION")),
    )
}
