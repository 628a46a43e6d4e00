use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use archiver_core::{Bookmark, BookmarkFilter, BookmarkId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("bookmark {0} not found")]
    NotFound(BookmarkId),
    #[error("bookmark {0} claims an archive without archive data")]
    IncompleteArchive(BookmarkId),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// The bookmark persistence the archiver reads from and writes back to.
///
/// Each call is assumed to be transactional on its own; the archiver never
/// spans a transaction across calls.
#[async_trait::async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Returns matching bookmarks in the store's natural (id) order.
    async fn get_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, StoreError>;

    /// Persists existing bookmarks and returns the records as saved.
    async fn save_bookmarks(&self, bookmarks: Vec<Bookmark>) -> Result<Vec<Bookmark>, StoreError>;
}

/// Rejects any record that would persist the archive flag without its payload.
pub fn check_archive_consistency(bookmarks: &[Bookmark]) -> Result<(), StoreError> {
    match bookmarks.iter().find(|b| !b.is_archive_consistent()) {
        Some(bad) => Err(StoreError::IncompleteArchive(bad.id)),
        None => Ok(()),
    }
}

/// In-process store keyed by id.
#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    bookmarks: Mutex<BTreeMap<BookmarkId, Bookmark>>,
}

impl MemoryBookmarkStore {
    pub fn with_bookmarks(bookmarks: impl IntoIterator<Item = Bookmark>) -> Self {
        let map = bookmarks.into_iter().map(|b| (b.id, b)).collect();
        Self {
            bookmarks: Mutex::new(map),
        }
    }

    pub fn get(&self, id: BookmarkId) -> Option<Bookmark> {
        self.lock().get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<BookmarkId, Bookmark>> {
        // A poisoned map is still structurally valid; keep serving it.
        self.bookmarks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn get_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, StoreError> {
        Ok(self
            .lock()
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn save_bookmarks(&self, bookmarks: Vec<Bookmark>) -> Result<Vec<Bookmark>, StoreError> {
        check_archive_consistency(&bookmarks)?;
        let mut map = self.lock();
        if let Some(missing) = bookmarks.iter().find(|b| !map.contains_key(&b.id)) {
            return Err(StoreError::NotFound(missing.id));
        }
        for bookmark in &bookmarks {
            map.insert(bookmark.id, bookmark.clone());
        }
        Ok(bookmarks)
    }
}
