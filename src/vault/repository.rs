//! Owner-scoped persistent storage for vault entries.
//!
//! Every method takes the owner explicitly and every implementation must
//! apply it to the underlying query. There is no way to read, change or
//! delete an entry through this interface without naming its owner, and an
//! entry owned by someone else behaves exactly like a missing one.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::entry::{Category, EntryId, EntryMetadata, VaultEntry};
use crate::crypto::SealedPayload;
use crate::db::Database;
use crate::errors::{NoteVaultError, Result};
use crate::identity::OwnerId;

/// Case folding used for `title_folded` and for search needles.
fn fold_title(title: &str) -> String {
    title.to_lowercase()
}

/// Filters understood by [`EntryRepository::count`] and
/// [`EntryRepository::find_page`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
    pub category: Option<Category>,
    pub favorites_only: bool,
}

/// Offset/limit window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

/// Column changes applied by [`EntryRepository::update`].
///
/// `payload` replaces ciphertext, nonce and tag together; there is no way to
/// change one of the three without the others.
#[derive(Debug, Clone)]
pub struct EntryChanges {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub is_favorite: Option<bool>,
    pub payload: Option<SealedPayload>,
    pub updated_at: DateTime<Utc>,
}

impl EntryChanges {
    /// No column changes apart from the update timestamp.
    pub fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            category: None,
            is_favorite: None,
            payload: None,
            updated_at,
        }
    }
}

/// Storage interface for vault entries.
pub trait EntryRepository: Send + Sync {
    /// Persist a new entry for `owner`.
    fn insert(&self, owner: &OwnerId, entry: &VaultEntry) -> Result<()>;

    /// Fetch one entry. `Ok(None)` if it is missing or not owned by `owner`.
    fn find(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<VaultEntry>>;

    /// Like [`find`](Self::find), but leaves the sealed payload unread.
    fn find_metadata(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<EntryMetadata>>;

    /// Apply `changes` in one atomic write. Returns `false` if the entry is
    /// missing or not owned by `owner`.
    fn update(&self, owner: &OwnerId, id: &EntryId, changes: &EntryChanges) -> Result<bool>;

    /// Remove an entry, returning its metadata, or `None` if missing or not owned.
    fn delete(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<EntryMetadata>>;

    /// Number of `owner`'s entries matching `filter`.
    fn count(&self, owner: &OwnerId, filter: &EntryFilter) -> Result<u64>;

    /// One window of `owner`'s matching entries, ordered favorites first,
    /// then newest first.
    fn find_page(
        &self,
        owner: &OwnerId,
        filter: &EntryFilter,
        window: PageWindow,
    ) -> Result<Vec<EntryMetadata>>;
}

/// [`EntryRepository`] backed by the shared SQLite [`Database`].
#[derive(Clone)]
pub struct SqliteEntryRepository {
    db: Database,
}

const METADATA_COLUMNS: &str = "id, title, category, is_favorite, created_at, updated_at";

impl SqliteEntryRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(index: usize, err: NoteVaultError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_timestamp(index: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            conversion_error(index, NoteVaultError::Storage(format!("bad timestamp: {e}")))
        })
}

/// Map a row selected with [`METADATA_COLUMNS`] (starting at column 0).
fn metadata_from_row(row: &Row<'_>) -> rusqlite::Result<EntryMetadata> {
    let id: String = row.get(0)?;
    let category: String = row.get(2)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(EntryMetadata {
        id: id.parse().map_err(|e| conversion_error(0, e))?,
        title: row.get(1)?,
        category: category.parse().map_err(|e| conversion_error(2, e))?,
        is_favorite: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
        updated_at: parse_timestamp(5, &updated_at)?,
    })
}

/// Escape `%`, `_` and `\` so user text matches literally inside `LIKE`.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Build the shared `WHERE` clause. The owner is always parameter `?1`.
fn filter_clause(owner: &OwnerId, filter: &EntryFilter) -> (String, Vec<rusqlite::types::Value>) {
    use rusqlite::types::Value;

    let mut sql = String::from("owner_id = ?1");
    let mut values = vec![Value::Text(owner.to_string())];

    if let Some(ref needle) = filter.title_contains {
        values.push(Value::Text(like_pattern(&fold_title(needle))));
        sql.push_str(&format!(" AND title_folded LIKE ?{} ESCAPE '\\'", values.len()));
    }
    if let Some(category) = filter.category {
        values.push(Value::Text(category.as_str().to_string()));
        sql.push_str(&format!(" AND category = ?{}", values.len()));
    }
    if filter.favorites_only {
        sql.push_str(" AND is_favorite = 1");
    }

    (sql, values)
}

impl EntryRepository for SqliteEntryRepository {
    fn insert(&self, owner: &OwnerId, entry: &VaultEntry) -> Result<()> {
        let meta = &entry.metadata;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entries (id, owner_id, title, category, ciphertext, nonce, tag,
                                      is_favorite, created_at, updated_at, title_folded)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    meta.id.to_string(),
                    owner.to_string(),
                    meta.title,
                    meta.category.as_str(),
                    entry.payload.ciphertext_hex(),
                    entry.payload.nonce_hex(),
                    entry.payload.tag_hex(),
                    meta.is_favorite,
                    format_timestamp(meta.created_at),
                    format_timestamp(meta.updated_at),
                    fold_title(&meta.title),
                ],
            )?;
            Ok(())
        })
    }

    fn find(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<VaultEntry>> {
        let row = self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {METADATA_COLUMNS}, ciphertext, nonce, tag
                         FROM entries WHERE id = ?1 AND owner_id = ?2"
                    ),
                    params![id.to_string(), owner.to_string()],
                    |row| {
                        Ok((
                            metadata_from_row(row)?,
                            row.get::<_, String>(6)?,
                            row.get::<_, String>(7)?,
                            row.get::<_, String>(8)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })?;

        match row {
            Some((metadata, ciphertext, nonce, tag)) => Ok(Some(VaultEntry {
                metadata,
                payload: SealedPayload::from_hex(&ciphertext, &nonce, &tag)?,
            })),
            None => Ok(None),
        }
    }

    fn find_metadata(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<EntryMetadata>> {
        self.db.with_conn(|conn| {
            let metadata = conn
                .query_row(
                    &format!(
                        "SELECT {METADATA_COLUMNS} FROM entries WHERE id = ?1 AND owner_id = ?2"
                    ),
                    params![id.to_string(), owner.to_string()],
                    metadata_from_row,
                )
                .optional()?;
            Ok(metadata)
        })
    }

    fn update(&self, owner: &OwnerId, id: &EntryId, changes: &EntryChanges) -> Result<bool> {
        let payload = changes.payload.as_ref();
        self.db.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE entries SET
                    title        = COALESCE(?3, title),
                    title_folded = COALESCE(?10, title_folded),
                    category     = COALESCE(?4, category),
                    is_favorite  = COALESCE(?5, is_favorite),
                    ciphertext   = COALESCE(?6, ciphertext),
                    nonce        = COALESCE(?7, nonce),
                    tag          = COALESCE(?8, tag),
                    updated_at   = ?9
                 WHERE id = ?1 AND owner_id = ?2",
                params![
                    id.to_string(),
                    owner.to_string(),
                    changes.title,
                    changes.category.map(|c| c.as_str()),
                    changes.is_favorite,
                    payload.map(SealedPayload::ciphertext_hex),
                    payload.map(SealedPayload::nonce_hex),
                    payload.map(SealedPayload::tag_hex),
                    format_timestamp(changes.updated_at),
                    changes.title.as_deref().map(fold_title),
                ],
            )?;
            Ok(affected == 1)
        })
    }

    fn delete(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<EntryMetadata>> {
        self.db.with_conn(|conn| {
            let deleted = conn
                .query_row(
                    &format!(
                        "DELETE FROM entries WHERE id = ?1 AND owner_id = ?2
                         RETURNING {METADATA_COLUMNS}"
                    ),
                    params![id.to_string(), owner.to_string()],
                    metadata_from_row,
                )
                .optional()?;
            Ok(deleted)
        })
    }

    fn count(&self, owner: &OwnerId, filter: &EntryFilter) -> Result<u64> {
        let (clause, values) = filter_clause(owner, filter);
        self.db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM entries WHERE {clause}"),
                rusqlite::params_from_iter(values.iter()),
                |row| row.get(0),
            )?;
            u64::try_from(count)
                .map_err(|_| NoteVaultError::Storage(format!("negative row count {count}")))
        })
    }

    fn find_page(
        &self,
        owner: &OwnerId,
        filter: &EntryFilter,
        window: PageWindow,
    ) -> Result<Vec<EntryMetadata>> {
        use rusqlite::types::Value;

        let (clause, mut values) = filter_clause(owner, filter);
        let offset = i64::try_from(window.offset)
            .map_err(|_| NoteVaultError::Validation("page offset too large".into()))?;
        values.push(Value::Integer(i64::from(window.limit)));
        let limit_param = values.len();
        values.push(Value::Integer(offset));
        let offset_param = values.len();

        let sql = format!(
            "SELECT {METADATA_COLUMNS} FROM entries
             WHERE {clause}
             ORDER BY is_favorite DESC, created_at DESC, seq DESC
             LIMIT ?{limit_param} OFFSET ?{offset_param}"
        );

        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), metadata_from_row)?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
    }
}
