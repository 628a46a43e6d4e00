use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use archiver_core::{Bookmark, BookmarkFilter, BookmarkId};
use archiver_engine::{
    check_archive_consistency, ensure_output_dir, AtomicFileWriter, BookmarkStore, StoreError,
};
use engine_logging::{engine_debug, engine_info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const STORE_FILENAME: &str = "bookmarks.ron";

type BookmarkMap = BTreeMap<BookmarkId, Bookmark>;

#[derive(Debug, Clone, Deserialize, Default)]
struct PersistedState {
    bookmarks: Vec<Bookmark>,
}

/// Serialized view of the live map, same shape as [`PersistedState`].
#[derive(Serialize)]
struct PersistedView<'a> {
    bookmarks: Vec<&'a Bookmark>,
}

/// Bookmark store kept in memory and mirrored to `{data_dir}/bookmarks.ron`.
///
/// Every mutation rewrites the whole file atomically on the blocking pool.
/// A failed write rolls the in-memory map back.
pub struct RonBookmarkStore {
    path: PathBuf,
    writer: AtomicFileWriter,
    bookmarks: Mutex<BookmarkMap>,
}

impl RonBookmarkStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let dir = data_dir.to_path_buf();
        let path = dir.join(STORE_FILENAME);
        let load_path = path.clone();
        let bookmarks = tokio::task::spawn_blocking(move || {
            ensure_output_dir(&dir).map_err(|err| StoreError::Unavailable(err.to_string()))?;
            load(&load_path)
        })
        .await
        .map_err(|err| StoreError::Unavailable(format!("spawn_blocking failed: {err}")))??;
        engine_info!("Loaded {} bookmarks from {:?}", bookmarks.len(), path);
        Ok(Self {
            path,
            writer: AtomicFileWriter::new(data_dir.to_path_buf()),
            bookmarks: Mutex::new(bookmarks),
        })
    }

    /// Adds a bookmark for an already normalized url.
    ///
    /// Returns `None` when the url is already bookmarked.
    pub async fn add(&self, url: &str) -> Result<Option<Bookmark>, StoreError> {
        let mut map = self.bookmarks.lock().await;
        if map.values().any(|b| b.url == url) {
            engine_debug!("Skipping duplicate bookmark {}", url);
            return Ok(None);
        }

        let id = map.keys().next_back().map_or(1, |last| last + 1);
        let bookmark = Bookmark::new(id, url);
        map.insert(id, bookmark.clone());
        if let Err(err) = self.persist(&map).await {
            map.remove(&id);
            return Err(err);
        }
        Ok(Some(bookmark))
    }

    pub async fn len(&self) -> usize {
        self.bookmarks.lock().await.len()
    }

    async fn persist(&self, bookmarks: &BookmarkMap) -> Result<(), StoreError> {
        let view = PersistedView {
            bookmarks: bookmarks.values().collect(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&view, pretty)
            .map_err(|err| StoreError::Backend(format!("serialize bookmarks: {err}")))?;
        self.writer
            .write_detached(STORE_FILENAME.to_string(), content)
            .await
            .map_err(|err| StoreError::Backend(format!("write {:?}: {err}", self.path)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl BookmarkStore for RonBookmarkStore {
    async fn get_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, StoreError> {
        Ok(self
            .bookmarks
            .lock()
            .await
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn save_bookmarks(&self, bookmarks: Vec<Bookmark>) -> Result<Vec<Bookmark>, StoreError> {
        check_archive_consistency(&bookmarks)?;
        let mut map = self.bookmarks.lock().await;
        if let Some(missing) = bookmarks.iter().find(|b| !map.contains_key(&b.id)) {
            return Err(StoreError::NotFound(missing.id));
        }

        let previous: Vec<Bookmark> = bookmarks
            .iter()
            .filter_map(|b| map.insert(b.id, b.clone()))
            .collect();
        if let Err(err) = self.persist(&map).await {
            for bookmark in previous {
                map.insert(bookmark.id, bookmark);
            }
            return Err(err);
        }
        Ok(bookmarks)
    }
}

fn load(path: &Path) -> Result<BookmarkMap, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(BTreeMap::new());
        }
        Err(err) => {
            return Err(StoreError::Unavailable(format!("read {path:?}: {err}")));
        }
    };

    let state: PersistedState = ron::from_str(&content)
        .map_err(|err| StoreError::Backend(format!("parse {path:?}: {err}")))?;
    Ok(state.bookmarks.into_iter().map(|b| (b.id, b)).collect())
}
