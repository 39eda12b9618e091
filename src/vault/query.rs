//! Filtering, ordering and pagination of entry metadata.
//!
//! The query engine only ever sees [`EntryMetadata`]; ciphertext never
//! leaves the repository on this path.

use serde::Serialize;

use super::entry::{Category, EntryMetadata};
use super::repository::{EntryFilter, EntryRepository, PageWindow};
use crate::errors::{NoteVaultError, Result};
use crate::identity::OwnerId;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size accepted unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// A listing request: optional filters plus a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub favorites_only: bool,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl Default for EntryQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            favorites_only: false,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EntryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn favorites_only(mut self, favorites_only: bool) -> Self {
        self.favorites_only = favorites_only;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn filter(&self) -> EntryFilter {
        EntryFilter {
            // A blank search string means "no title filter"; anything else
            // is matched as given, surrounding spaces included.
            title_contains: self
                .search
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            category: self.category,
            favorites_only: self.favorites_only,
        }
    }
}

/// One page of results plus the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPage {
    pub entries: Vec<EntryMetadata>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
}

/// Runs [`EntryQuery`]s against a repository.
pub struct QueryEngine<'a, R: EntryRepository> {
    repo: &'a R,
    max_page_size: u32,
}

impl<'a, R: EntryRepository> QueryEngine<'a, R> {
    pub fn new(repo: &'a R, max_page_size: u32) -> Self {
        Self {
            repo,
            max_page_size,
        }
    }

    /// Count the matches and fetch the requested page.
    ///
    /// Count and page are two reads; a concurrent write between them can
    /// make the totals disagree with the page by one. Pages past the end
    /// come back empty with correct totals.
    pub fn run(&self, owner: &OwnerId, query: &EntryQuery) -> Result<EntryPage> {
        if query.page == 0 {
            return Err(NoteVaultError::Validation(
                "page numbers start at 1".into(),
            ));
        }
        if query.page_size == 0 || query.page_size > self.max_page_size {
            return Err(NoteVaultError::Validation(format!(
                "page size must be between 1 and {} (got {})",
                self.max_page_size, query.page_size
            )));
        }

        let filter = query.filter();
        let total_count = self.repo.count(owner, &filter)?;
        let page_size = u64::from(query.page_size);
        let total_pages = total_count.div_ceil(page_size);

        let window = PageWindow {
            offset: u64::from(query.page - 1) * page_size,
            limit: query.page_size,
        };
        let entries = if window.offset < total_count {
            self.repo.find_page(owner, &filter, window)?
        } else {
            Vec::new()
        };

        Ok(EntryPage {
            entries,
            total_count,
            total_pages,
            current_page: query.page,
            page_size: query.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_filter() {
        let filter = EntryQuery::new().search("   ").filter();
        assert!(filter.title_contains.is_none());
    }

    #[test]
    fn search_keeps_surrounding_spaces() {
        let filter = EntryQuery::new().search(" bank ").filter();
        assert_eq!(filter.title_contains.as_deref(), Some(" bank "));
    }

    #[test]
    fn defaults_are_first_page_of_ten() {
        let q = EntryQuery::default();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, DEFAULT_PAGE_SIZE);
        assert!(!q.favorites_only);
    }
}
