use std::sync::Arc;

use archiver_core::{ArchiverOptions, BookmarkFilter, ScanReport};
use engine_logging::{engine_debug, engine_error, engine_warn};
use tokio::sync::mpsc;

use crate::{ArchiveTask, BookmarkProcessor, BookmarkStore, WorkerPool};

/// One pass of "find every bookmark without an archive and try to archive it".
pub struct ScanCycle {
    store: Arc<dyn BookmarkStore>,
    task: Arc<ArchiveTask>,
    options: ArchiverOptions,
}

impl ScanCycle {
    pub fn new(
        store: Arc<dyn BookmarkStore>,
        processor: Arc<dyn BookmarkProcessor>,
        options: ArchiverOptions,
    ) -> Self {
        let task = Arc::new(ArchiveTask::new(store.clone(), processor));
        Self {
            store,
            task,
            options,
        }
    }

    /// Runs a full cycle and returns only after every dispatched item has been
    /// attempted.
    pub async fn run(&self) -> ScanReport {
        let bookmarks = match self
            .store
            .get_bookmarks(&BookmarkFilter::missing_archive())
            .await
        {
            Ok(bookmarks) => bookmarks,
            Err(err) => {
                engine_error!("scan bookmarks error {}", err);
                return ScanReport::Failed;
            }
        };

        let count = bookmarks.len();
        if count == 0 {
            engine_debug!("scan nothing");
            return ScanReport::Idle;
        }

        // Sized to the batch so no send ever waits.
        let (queue_tx, queue_rx) = mpsc::channel(count);
        let pool = WorkerPool::spawn(
            self.task.clone(),
            queue_rx,
            self.options.worker_count(count),
        );

        for bookmark in bookmarks {
            engine_debug!("scan bookmark {}", bookmark.id);
            if let Err(err) = queue_tx.send(bookmark).await {
                engine_error!("archive queue closed early, bookmark {} not dispatched", err.0.id);
                break;
            }
        }
        drop(queue_tx);

        let attempted = pool.join().await;
        if attempted != count {
            engine_warn!("scan dispatched {} bookmarks but {} were attempted", count, attempted);
        }
        ScanReport::Processed(attempted)
    }
}
