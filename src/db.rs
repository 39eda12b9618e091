//! SQLite database handle shared by the account and entry stores.
//!
//! The connection sits behind `Arc<Mutex<_>>` so the handle is cheap to
//! clone and safe to share. Foreign keys are switched on at open time and
//! the schema is brought up to date with `user_version`-based migrations.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::errors::{NoteVaultError, Result};

/// File name of the main database inside the data directory.
pub const DB_FILE: &str = "notevault.db";

/// Ordered schema migrations. Index `i` upgrades `user_version` from `i` to `i + 1`.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE users (
        id            TEXT PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        key_salt      TEXT NOT NULL,
        created_at    TEXT NOT NULL,
        last_login_at TEXT
    );
    CREATE TABLE entries (
        seq         INTEGER PRIMARY KEY AUTOINCREMENT,
        id          TEXT NOT NULL UNIQUE,
        owner_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title       TEXT NOT NULL,
        category    TEXT NOT NULL CHECK (category IN ('note', 'password', 'secret')),
        ciphertext  TEXT NOT NULL,
        nonce       TEXT NOT NULL,
        tag         TEXT NOT NULL,
        is_favorite INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    );
    CREATE INDEX idx_entries_owner ON entries (owner_id);
    CREATE INDEX idx_entries_owner_listing
        ON entries (owner_id, is_favorite DESC, created_at DESC);",
    // Lower-cased title for case-insensitive search. SQLite's own case
    // folding is ASCII-only, so the value is computed in Rust; see
    // `backfill_folded_titles`.
    "ALTER TABLE entries ADD COLUMN title_folded TEXT NOT NULL DEFAULT '';",
];

/// Central database handle. Cheap to clone (Arc internally).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database in `data_dir`, creating the directory if
    /// needed. Runs all pending migrations.
    pub fn open(data_dir: &Path) -> Result<Self> {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir)?;
        }

        let db_path = data_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;

        // Owner-only permissions on the database file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&db_path, perms)?;
        }

        Self::init(conn)
    }

    /// Open a private in-memory database (tests).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| NoteVaultError::Storage("database lock poisoned".into()))?;
        f(&conn)
    }
}

/// Apply every migration newer than the stored `user_version`.
fn migrate(conn: &Connection) -> Result<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let current = usize::try_from(version).unwrap_or(0);

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        let target = index + 1;
        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nPRAGMA user_version = {target};\nCOMMIT;"
        ))
        .map_err(|e| NoteVaultError::Storage(format!("migration {target} failed: {e}")))?;
        tracing::debug!(version = target, "applied schema migration");
    }

    backfill_folded_titles(conn)
}

/// Fill `title_folded` for rows written before the column existed.
fn backfill_folded_titles(conn: &Connection) -> Result<()> {
    let rows: Vec<(i64, String)> = {
        let mut stmt =
            conn.prepare("SELECT seq, title FROM entries WHERE title_folded = '' AND title <> ''")?;
        let mapped = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        mapped.collect::<rusqlite::Result<_>>()?
    };

    let mut stmt = conn.prepare("UPDATE entries SET title_folded = ?2 WHERE seq = ?1")?;
    for (seq, title) in &rows {
        stmt.execute(rusqlite::params![seq, title.to_lowercase()])?;
    }
    if !rows.is_empty() {
        tracing::debug!(rows = rows.len(), "backfilled folded titles");
    }
    Ok(())
}
