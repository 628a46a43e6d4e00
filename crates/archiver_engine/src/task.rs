use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use archiver_core::{Bookmark, BookmarkId};
use engine_logging::{engine_error, engine_info};
use futures_util::FutureExt;
use thiserror::Error;

use crate::{BookmarkProcessor, BookmarkStore, ProcessError, StoreError};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("download bookmark({id}) error: {source}")]
    Process {
        id: BookmarkId,
        #[source]
        source: ProcessError,
    },
    #[error("bookmark({0}) was processed without archive data")]
    IncompleteArchive(BookmarkId),
    #[error("failed to save bookmark({id}): {source}")]
    Save {
        id: BookmarkId,
        #[source]
        source: StoreError,
    },
    #[error("store saved nothing for bookmark({0})")]
    NotSaved(BookmarkId),
    #[error("archiving bookmark({id}) panicked: {message}")]
    Panicked { id: BookmarkId, message: String },
}

impl ArchiveError {
    /// Failures caused by a broken pipeline rather than by the bookmark.
    pub fn is_fatal(&self) -> bool {
        match self {
            ArchiveError::Process { source, .. } => source.is_fatal(),
            ArchiveError::Panicked { .. } => true,
            _ => false,
        }
    }
}

/// Archives a single bookmark: mark, fetch and process, then save.
///
/// One attempt per call. A failed attempt leaves the stored record untouched,
/// so the next scan picks the bookmark up again.
pub struct ArchiveTask {
    store: Arc<dyn BookmarkStore>,
    processor: Arc<dyn BookmarkProcessor>,
}

impl ArchiveTask {
    pub fn new(store: Arc<dyn BookmarkStore>, processor: Arc<dyn BookmarkProcessor>) -> Self {
        Self { store, processor }
    }

    pub async fn run(&self, mut bookmark: Bookmark) -> Result<Bookmark, ArchiveError> {
        let id = bookmark.id;
        bookmark.request_archive();

        let updated = self
            .processor
            .process(bookmark)
            .await
            .map_err(|source| ArchiveError::Process { id, source })?;

        // Flag and payload are persisted together or not at all.
        if !updated.is_archive_consistent() {
            return Err(ArchiveError::IncompleteArchive(id));
        }

        let saved = self
            .store
            .save_bookmarks(vec![updated])
            .await
            .map_err(|source| ArchiveError::Save { id, source })?;
        saved.into_iter().next().ok_or(ArchiveError::NotSaved(id))
    }

    /// Runs one item behind a failure boundary: errors are logged here and a
    /// panic inside the pipeline is caught and reported as
    /// [`ArchiveError::Panicked`] instead of unwinding into the worker.
    pub async fn run_isolated(&self, bookmark: Bookmark) -> Result<Bookmark, ArchiveError> {
        let id = bookmark.id;
        let url = bookmark.url.clone();

        let result = match AssertUnwindSafe(self.run(bookmark)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(ArchiveError::Panicked {
                id,
                message: panic_message(payload.as_ref()),
            }),
        };

        match &result {
            Ok(_) => engine_info!("archive bookmark successfully id={} url={}", id, url),
            Err(err) if err.is_fatal() => {
                engine_error!("fatal archive failure id={} url={}: {}", id, url, err)
            }
            Err(err) => engine_error!("archive failed id={} url={}: {}", id, url, err),
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}
