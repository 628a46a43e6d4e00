#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use archiver_core::{ArchiveInfo, Bookmark, BookmarkFilter, BookmarkId};
use archiver_engine::{
    BookmarkProcessor, BookmarkStore, MemoryBookmarkStore, ProcessError, StoreError,
};
use tokio::sync::watch;

pub fn bookmarks(count: u64) -> Vec<Bookmark> {
    (1..=count)
        .map(|id| Bookmark::new(id, format!("https://example.com/{id}")))
        .collect()
}

/// Processor double with per-id outcomes and in-flight accounting.
#[derive(Default)]
pub struct ScriptedProcessor {
    delay: Duration,
    failing: HashSet<BookmarkId>,
    fatal: HashSet<BookmarkId>,
    panicking: HashSet<BookmarkId>,
    incomplete: HashSet<BookmarkId>,
    gate: Option<watch::Receiver<bool>>,
    calls: Mutex<Vec<BookmarkId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    finished: AtomicUsize,
}

impl ScriptedProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, id: BookmarkId) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn fatal(mut self, id: BookmarkId) -> Self {
        self.fatal.insert(id);
        self
    }

    pub fn panicking(mut self, id: BookmarkId) -> Self {
        self.panicking.insert(id);
        self
    }

    pub fn incomplete(mut self, id: BookmarkId) -> Self {
        self.incomplete.insert(id);
        self
    }

    /// Every call waits until the watched value becomes `true`.
    pub fn gated(mut self, gate: watch::Receiver<bool>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<BookmarkId> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BookmarkProcessor for ScriptedProcessor {
    async fn process(&self, mut bookmark: Bookmark) -> Result<Bookmark, ProcessError> {
        assert!(bookmark.create_archive, "archive must be requested before processing");
        self.calls.lock().unwrap().push(bookmark.id);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            let _ = gate.wait_for(|open| *open).await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.fetch_add(1, Ordering::SeqCst);

        let id = bookmark.id;
        if self.panicking.contains(&id) {
            panic!("pipeline invariant broken for {id}");
        }
        if self.fatal.contains(&id) {
            return Err(ProcessError::Fatal(format!("archive storage gone for {id}")));
        }
        if self.failing.contains(&id) {
            return Err(ProcessError::Recoverable(format!("unreachable host for {id}")));
        }
        if self.incomplete.contains(&id) {
            bookmark.has_archive = true;
            return Ok(bookmark);
        }

        bookmark.attach_archive(ArchiveInfo {
            path: PathBuf::from(format!("archive/{id}.md")),
            final_url: bookmark.url.clone(),
            content_type: Some("text/html".to_string()),
            byte_len: 42,
        });
        Ok(bookmark)
    }
}

/// Memory store that counts calls and can be told to fail.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryBookmarkStore,
    reads: AtomicUsize,
    saves: AtomicUsize,
    failing_reads: AtomicUsize,
    fail_saves: AtomicBool,
    save_nothing: AtomicBool,
    saved_ids: Mutex<Vec<BookmarkId>>,
}

impl CountingStore {
    pub fn with_bookmarks(bookmarks: Vec<Bookmark>) -> Self {
        Self {
            inner: MemoryBookmarkStore::with_bookmarks(bookmarks),
            ..Self::default()
        }
    }

    /// The next `count` reads return an error.
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn save_nothing(&self) {
        self.save_nothing.store(true, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn saved_ids(&self) -> Vec<BookmarkId> {
        let mut ids = self.saved_ids.lock().unwrap().clone();
        ids.sort_unstable();
        ids
    }

    pub fn get(&self, id: BookmarkId) -> Option<Bookmark> {
        self.inner.get(id)
    }
}

#[async_trait::async_trait]
impl BookmarkStore for CountingStore {
    async fn get_bookmarks(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("database is locked".to_string()));
        }
        self.inner.get_bookmarks(filter).await
    }

    async fn save_bookmarks(&self, bookmarks: Vec<Bookmark>) -> Result<Vec<Bookmark>, StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        if self.save_nothing.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        let saved = self.inner.save_bookmarks(bookmarks).await?;
        self.saved_ids
            .lock()
            .unwrap()
            .extend(saved.iter().map(|b| b.id));
        Ok(saved)
    }
}

/// Polls `condition` every few milliseconds until it holds or `limit` passes.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
