//! Audit log — SQLite-based record of sensitive operations.
//!
//! Every successful register, login, logout and entry create/view/update/
//! delete produces one event. Events go to an [`AuditSink`]; the default
//! sink is a local SQLite database at `<data_dir>/audit.db`.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations continue without logging. Sink failures are
//! reported through `tracing` and never reach the caller.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::errors::{NoteVaultError, Result};
use crate::identity::{OwnerId, RequestContext};

/// Kind of operation being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Login,
    Register,
    Logout,
    CreateEntry,
    ViewEntry,
    UpdateEntry,
    DeleteEntry,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Register => "REGISTER",
            Self::Logout => "LOGOUT",
            Self::CreateEntry => "CREATE_ENTRY",
            Self::ViewEntry => "VIEW_ENTRY",
            Self::UpdateEntry => "UPDATE_ENTRY",
            Self::DeleteEntry => "DELETE_ENTRY",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub actor: OwnerId,
    pub action: AuditAction,
    pub details: Option<String>,
    pub origin: Option<String>,
    pub client: Option<String>,
}

impl AuditEvent {
    pub fn new(
        actor: OwnerId,
        action: AuditAction,
        details: Option<String>,
        ctx: &RequestContext,
    ) -> Self {
        Self {
            actor,
            action,
            details,
            origin: ctx.origin.clone(),
            client: ctx.client.clone(),
        }
    }
}

/// Destination for audit events.
///
/// Implementations may fail; callers go through [`emit`], which logs and
/// drops the error.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// A missing sink (e.g. the audit database could not be opened) drops events.
impl<A: AuditSink> AuditSink for Option<A> {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        match self {
            Some(sink) => sink.record(event),
            None => Ok(()),
        }
    }
}

impl<A: AuditSink + ?Sized> AuditSink for Arc<A> {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        (**self).record(event)
    }
}

/// Record an event. Fire-and-forget — errors are logged, never returned.
pub fn emit<S: AuditSink + ?Sized>(sink: &S, event: AuditEvent) {
    if let Err(e) = sink.record(&event) {
        tracing::warn!(
            action = %event.action,
            actor = %event.actor,
            error = %e,
            "audit event dropped"
        );
    }
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A single stored audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub details: Option<String>,
    pub origin: Option<String>,
    pub client: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Mutex<Connection>,
}

impl AuditLog {
    /// Open (or create) the audit database at `<data_dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened — callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(data_dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(data_dir);
        let conn = match Connection::open(&db_path) {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(path = %db_path.display(), error = %e, "audit log unavailable");
                return None;
            }
        };

        // Set restrictive permissions on the audit database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        Self::init(conn)
    }

    /// Open a private in-memory audit log (tests).
    pub fn open_in_memory() -> Option<Self> {
        Self::init(Connection::open_in_memory().ok()?)
    }

    fn init(conn: Connection) -> Option<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp  TEXT NOT NULL,
                actor_id   TEXT NOT NULL,
                action     TEXT NOT NULL,
                details    TEXT,
                origin     TEXT,
                client     TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_audit_actor ON audit_log (actor_id);",
        )
        .ok()?;

        Some(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Query recent audit entries for one actor.
    ///
    /// - `limit`: maximum number of entries to return (most recent first).
    /// - `since`: if provided, only return entries newer than this timestamp.
    pub fn query(
        &self,
        actor: &OwnerId,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        // An absent `since` is bound as the empty string, which sorts before every timestamp.
        let since_str = since.map(format_timestamp).unwrap_or_default();

        let conn = self
            .conn
            .lock()
            .map_err(|_| NoteVaultError::AuditError("audit lock poisoned".into()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, timestamp, actor_id, action, details, origin, client
                 FROM audit_log
                 WHERE actor_id = ?1 AND timestamp >= ?2
                 ORDER BY id DESC
                 LIMIT ?3",
            )
            .map_err(|e| NoteVaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(
                rusqlite::params![actor.to_string(), since_str, limit_i64],
                |row| {
                    let ts_str: String = row.get(1)?;
                    let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                1,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?;

                    Ok(AuditEntry {
                        id: row.get(0)?,
                        timestamp,
                        actor: row.get(2)?,
                        action: row.get(3)?,
                        details: row.get(4)?,
                        origin: row.get(5)?,
                        client: row.get(6)?,
                    })
                },
            )
            .map_err(|e| NoteVaultError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| NoteVaultError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    /// Return the path to the audit database (for testing/display).
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("audit.db")
    }
}

impl AuditSink for AuditLog {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        let now = format_timestamp(Utc::now());
        let conn = self
            .conn
            .lock()
            .map_err(|_| NoteVaultError::AuditError("audit lock poisoned".into()))?;
        conn.execute(
            "INSERT INTO audit_log (timestamp, actor_id, action, details, origin, client)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                now,
                event.actor.to_string(),
                event.action.as_str(),
                event.details,
                event.origin,
                event.client
            ],
        )
        .map_err(|e| NoteVaultError::AuditError(format!("insert: {e}")))?;
        Ok(())
    }
}
