use archiver_core::{normalize_bookmark_url, ArchiverNotifier};
use engine_logging::{engine_info, engine_warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::error::AppError;
use super::persistence::RonBookmarkStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IntakeStats {
    pub added: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Reads one url per line, bookmarks each new one and wakes the archiver.
///
/// Blank lines and `#` comments are skipped. Returns when the input ends.
pub async fn run<R>(
    input: R,
    store: &RonBookmarkStore,
    notifier: &dyn ArchiverNotifier,
) -> Result<IntakeStats, AppError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = IntakeStats::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(url) = normalize_bookmark_url(line) else {
            engine_warn!("Ignoring invalid url {:?}", line);
            stats.rejected += 1;
            continue;
        };
        match store.add(&url).await? {
            Some(bookmark) => {
                engine_info!("Bookmarked {} as {}", bookmark.url, bookmark.id);
                stats.added += 1;
                notifier.notify();
            }
            None => stats.duplicates += 1,
        }
    }
    Ok(stats)
}
