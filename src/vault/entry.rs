//! Vault entry types.
//!
//! Input types (`NewEntry`, `EntryPatch`) are validated when they are
//! built, so the store never sees an empty title, an unknown category, or
//! an ambiguous "was this field supplied" state. Output types are split
//! into `EntryMetadata` (safe for bulk listings, no ciphertext fields at
//! all) and `EntryView` (metadata plus decrypted content).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::SealedPayload;
use crate::errors::{NoteVaultError, Result};

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum content size in bytes (64 KiB).
pub const MAX_CONTENT_LEN: usize = 64 * 1024;

/// Identifier of a vault entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntryId {
    type Err = NoteVaultError;

    /// A malformed id cannot name any entry, so it is reported as not found.
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| NoteVaultError::EntryNotFound)
    }
}

/// The closed set of entry categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Note,
    Password,
    Secret,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Note, Category::Password, Category::Secret];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Password => "password",
            Self::Secret => "secret",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = NoteVaultError;

    /// Exact match only; values outside the set are never coerced.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "note" => Ok(Self::Note),
            "password" => Ok(Self::Password),
            "secret" => Ok(Self::Secret),
            other => Err(NoteVaultError::Validation(format!(
                "unknown category '{other}' — expected one of: note, password, secret"
            ))),
        }
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NoteVaultError::Validation("title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(NoteVaultError::Validation(format!(
            "title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> Result<Zeroizing<String>> {
    if content.is_empty() {
        return Err(NoteVaultError::Validation("content cannot be empty".into()));
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(NoteVaultError::Validation(format!(
            "content cannot exceed {MAX_CONTENT_LEN} bytes"
        )));
    }
    Ok(Zeroizing::new(content.to_string()))
}

/// A validated request to create an entry.
pub struct NewEntry {
    title: String,
    category: Category,
    content: Zeroizing<String>,
}

impl NewEntry {
    /// Validate raw input. Fails before any key is derived or row written.
    pub fn new(title: &str, category: &str, content: &str) -> Result<Self> {
        Ok(Self {
            title: validate_title(title)?,
            category: category.parse()?,
            content: validate_content(content)?,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub(crate) fn content(&self) -> &str {
        &self.content
    }
}

impl fmt::Debug for NewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewEntry")
            .field("title", &self.title)
            .field("category", &self.category)
            .field("content", &"<redacted>")
            .finish()
    }
}

/// A validated partial update. Absent fields are left unchanged.
#[derive(Default)]
pub struct EntryPatch {
    title: Option<String>,
    category: Option<Category>,
    favorite: Option<bool>,
    content: Option<Zeroizing<String>>,
}

impl EntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Result<Self> {
        self.title = Some(validate_title(title)?);
        Ok(self)
    }

    pub fn category(mut self, category: &str) -> Result<Self> {
        self.category = Some(category.parse()?);
        Ok(self)
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = Some(favorite);
        self
    }

    pub fn content(mut self, content: &str) -> Result<Self> {
        self.content = Some(validate_content(content)?);
        Ok(self)
    }

    /// `true` if no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.favorite.is_none()
            && self.content.is_none()
    }

    pub(crate) fn title_value(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn category_value(&self) -> Option<Category> {
        self.category
    }

    pub(crate) fn favorite_value(&self) -> Option<bool> {
        self.favorite
    }

    pub(crate) fn content_value(&self) -> Option<&str> {
        self.content.as_deref().map(String::as_str)
    }
}

impl fmt::Debug for EntryPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPatch")
            .field("title", &self.title)
            .field("category", &self.category)
            .field("favorite", &self.favorite)
            .field("content", &self.content.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A stored entry as the repository holds it: metadata plus sealed content.
#[derive(Debug, Clone)]
pub struct VaultEntry {
    pub metadata: EntryMetadata,
    pub payload: SealedPayload,
}

/// Non-sensitive entry fields. Never carries ciphertext, nonce or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryMetadata {
    pub id: EntryId,
    pub title: String,
    pub category: Category,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata plus decrypted content, returned by a single-entry read.
#[derive(Clone, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub metadata: EntryMetadata,
    #[serde(serialize_with = "serialize_content")]
    pub content: Zeroizing<String>,
}

fn serialize_content<S>(content: &Zeroizing<String>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(content)
}

impl fmt::Debug for EntryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryView")
            .field("metadata", &self.metadata)
            .field("content", &"<redacted>")
            .finish()
    }
}
