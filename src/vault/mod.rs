//! Vault module — encrypted entry storage.
//!
//! This module provides:
//! - Entry, category and validated input types (`entry`)
//! - Owner-scoped persistence with a SQLite implementation (`repository`)
//! - Metadata filtering and pagination (`query`)
//! - High-level `VaultEntryStore` for the entry lifecycle (`store`)

pub mod entry;
pub mod query;
pub mod repository;
pub mod store;

// Re-export the most commonly used items.
pub use entry::{Category, EntryId, EntryMetadata, EntryPatch, EntryView, NewEntry, VaultEntry};
pub use query::{EntryPage, EntryQuery, QueryEngine};
pub use repository::{EntryChanges, EntryFilter, EntryRepository, PageWindow, SqliteEntryRepository};
pub use store::VaultEntryStore;
