use std::sync::Arc;

use archiver_core::Bookmark;
use engine_logging::{engine_debug, engine_error};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::ArchiveTask;

type SharedQueue = Arc<Mutex<mpsc::Receiver<Bookmark>>>;

/// A fixed set of workers draining one queue of bookmarks.
///
/// Workers exit once the queue is closed and empty; [`WorkerPool::join`] is
/// the barrier that waits for all of them.
pub struct WorkerPool {
    workers: JoinSet<usize>,
}

impl WorkerPool {
    /// Spawns `count` workers on the current Tokio runtime.
    pub fn spawn(task: Arc<ArchiveTask>, queue: mpsc::Receiver<Bookmark>, count: usize) -> Self {
        let queue: SharedQueue = Arc::new(Mutex::new(queue));
        let mut workers = JoinSet::new();
        for idx in 0..count {
            let task = task.clone();
            let queue = queue.clone();
            workers.spawn(run_worker(idx, task, queue));
        }
        Self { workers }
    }

    /// Waits for every worker and returns how many items they attempted.
    pub async fn join(mut self) -> usize {
        let mut attempted = 0;
        while let Some(joined) = self.workers.join_next().await {
            match joined {
                Ok(count) => attempted += count,
                Err(err) => engine_error!("archive worker terminated abnormally: {}", err),
            }
        }
        attempted
    }
}

async fn run_worker(idx: usize, task: Arc<ArchiveTask>, queue: SharedQueue) -> usize {
    engine_debug!("archive worker[{}] started", idx);
    let mut attempted = 0;
    loop {
        // The lock is held only while taking one item, never while processing it.
        let next = queue.lock().await.recv().await;
        let Some(bookmark) = next else {
            break;
        };
        let _ = task.run_isolated(bookmark).await;
        attempted += 1;
    }
    engine_debug!("archive worker[{}] stopped", idx);
    attempted
}
