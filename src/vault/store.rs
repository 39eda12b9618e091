//! High-level vault operations.
//!
//! `VaultEntryStore` ties the key deriver, the cipher, the repository and
//! the audit sink together. Plaintext only exists inside `create`, `get`
//! and `update`; everything persisted is sealed, and nothing but `get`
//! ever returns content.

use chrono::{DateTime, SubsecRound, Utc};
use tracing::debug;

use super::entry::{EntryId, EntryMetadata, EntryPatch, EntryView, NewEntry, VaultEntry};
use super::query::{EntryPage, EntryQuery, QueryEngine, DEFAULT_MAX_PAGE_SIZE};
use super::repository::{EntryChanges, EntryRepository};
use crate::audit::{emit, AuditAction, AuditEvent, AuditSink};
use crate::crypto::{open_to_string, seal, KeyDeriver};
use crate::errors::{NoteVaultError, Result};
use crate::identity::{Identity, RequestContext};

/// The vault entry store. Build one per process and share it.
pub struct VaultEntryStore<R: EntryRepository, A: AuditSink> {
    deriver: KeyDeriver,
    repo: R,
    audit: A,
    max_page_size: u32,
}

impl<R: EntryRepository, A: AuditSink> VaultEntryStore<R, A> {
    pub fn new(deriver: KeyDeriver, repo: R, audit: A) -> Self {
        Self {
            deriver,
            repo,
            audit,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Override the largest page size `list` accepts.
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Seal and store a new entry. Returns metadata only.
    pub fn create(
        &self,
        who: &Identity,
        ctx: &RequestContext,
        input: NewEntry,
    ) -> Result<EntryMetadata> {
        let key = self.deriver.derive(&who.key_salt)?;
        let payload = seal(&key, input.content().as_bytes())?;
        drop(key);

        let now = stored_now();
        let metadata = EntryMetadata {
            id: EntryId::new(),
            title: input.title().to_string(),
            category: input.category(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(
            &who.owner,
            &VaultEntry {
                metadata: metadata.clone(),
                payload,
            },
        )?;
        debug!(entry = %metadata.id, owner = %who.owner, "created vault entry");

        self.record(
            who,
            ctx,
            AuditAction::CreateEntry,
            format!("Created {} entry: {}", metadata.category, metadata.title),
        );

        Ok(metadata)
    }

    /// Decrypt and return one entry.
    ///
    /// Entries owned by someone else are reported as `EntryNotFound`, exactly
    /// like missing ones. A tag that does not verify is `IntegrityFailure`.
    pub fn get(&self, who: &Identity, ctx: &RequestContext, id: &EntryId) -> Result<EntryView> {
        let entry = self
            .repo
            .find(&who.owner, id)?
            .ok_or(NoteVaultError::EntryNotFound)?;

        let key = self.deriver.derive(&who.key_salt)?;
        let content = open_to_string(&key, &entry.payload).map_err(|e| {
            if matches!(e, NoteVaultError::IntegrityFailure) {
                tracing::warn!(entry = %id, owner = %who.owner, "entry failed integrity check");
            }
            e
        })?;
        drop(key);

        self.record(
            who,
            ctx,
            AuditAction::ViewEntry,
            format!(
                "Viewed {} entry: {}",
                entry.metadata.category, entry.metadata.title
            ),
        );

        Ok(EntryView {
            metadata: entry.metadata,
            content,
        })
    }

    /// Apply a partial update. Returns the updated metadata.
    ///
    /// Supplying content re-seals it under a fresh nonce and replaces
    /// ciphertext, nonce and tag in the same write. Without content the
    /// stored payload is not touched.
    pub fn update(
        &self,
        who: &Identity,
        ctx: &RequestContext,
        id: &EntryId,
        patch: EntryPatch,
    ) -> Result<EntryMetadata> {
        if patch.is_empty() {
            return Err(NoteVaultError::Validation(
                "nothing to update — supply a title, category, favorite flag or content".into(),
            ));
        }

        // Scoped existence check before any key is derived.
        if self.repo.find_metadata(&who.owner, id)?.is_none() {
            return Err(NoteVaultError::EntryNotFound);
        }

        let payload = match patch.content_value() {
            Some(content) => {
                let key = self.deriver.derive(&who.key_salt)?;
                Some(seal(&key, content.as_bytes())?)
            }
            None => None,
        };

        let changes = EntryChanges {
            title: patch.title_value().map(str::to_string),
            category: patch.category_value(),
            is_favorite: patch.favorite_value(),
            payload,
            updated_at: stored_now(),
        };

        // The entry may have been deleted since the check above.
        if !self.repo.update(&who.owner, id, &changes)? {
            return Err(NoteVaultError::EntryNotFound);
        }

        let metadata = self
            .repo
            .find_metadata(&who.owner, id)?
            .ok_or(NoteVaultError::EntryNotFound)?;
        debug!(
            entry = %id,
            owner = %who.owner,
            resealed = changes.payload.is_some(),
            "updated vault entry"
        );

        self.record(
            who,
            ctx,
            AuditAction::UpdateEntry,
            format!("Updated {} entry: {}", metadata.category, metadata.title),
        );

        Ok(metadata)
    }

    /// Permanently remove an entry.
    pub fn delete(&self, who: &Identity, ctx: &RequestContext, id: &EntryId) -> Result<()> {
        let removed = self
            .repo
            .delete(&who.owner, id)?
            .ok_or(NoteVaultError::EntryNotFound)?;
        debug!(entry = %id, owner = %who.owner, "deleted vault entry");

        self.record(
            who,
            ctx,
            AuditAction::DeleteEntry,
            format!("Deleted {} entry: {}", removed.category, removed.title),
        );

        Ok(())
    }

    /// List the caller's entry metadata. Never decrypts anything.
    pub fn list(&self, who: &Identity, query: &EntryQuery) -> Result<EntryPage> {
        QueryEngine::new(&self.repo, self.max_page_size).run(&who.owner, query)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn record(&self, who: &Identity, ctx: &RequestContext, action: AuditAction, details: String) {
        emit(
            &self.audit,
            AuditEvent::new(who.owner, action, Some(details), ctx),
        );
    }
}

/// Current time at the precision timestamps are stored with.
fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
