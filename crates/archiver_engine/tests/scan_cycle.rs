mod common;

use std::sync::Arc;
use std::time::Duration;

use archiver_core::{ArchiverOptions, ScanReport};
use archiver_engine::ScanCycle;
use common::{bookmarks, CountingStore, ScriptedProcessor};
use pretty_assertions::assert_eq;

fn options(concurrent: usize) -> ArchiverOptions {
    ArchiverOptions::new(concurrent, Duration::from_secs(3600)).unwrap()
}

fn cycle(
    store: &Arc<CountingStore>,
    processor: &Arc<ScriptedProcessor>,
    concurrent: usize,
) -> ScanCycle {
    ScanCycle::new(store.clone(), processor.clone(), options(concurrent))
}

#[tokio::test]
async fn empty_store_is_idle_and_touches_nothing() {
    engine_logging::initialize_for_tests();
    let store = Arc::new(CountingStore::with_bookmarks(Vec::new()));
    let processor = Arc::new(ScriptedProcessor::new());

    let report = cycle(&store, &processor, 4).run().await;

    assert_eq!(report, ScanReport::Idle);
    assert_eq!(report.as_count(), 0);
    assert_eq!(store.reads(), 1);
    assert_eq!(store.saves(), 0);
    assert_eq!(processor.call_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_items_with_two_workers_never_exceed_two_in_flight() {
    let store = Arc::new(CountingStore::with_bookmarks(bookmarks(3)));
    let processor = Arc::new(ScriptedProcessor::new().with_delay(Duration::from_millis(50)));

    let report = cycle(&store, &processor, 2).run().await;

    assert_eq!(report, ScanReport::Processed(3));
    assert_eq!(processor.max_in_flight(), 2);
    assert_eq!(processor.finished(), 3);
    assert_eq!(store.saved_ids(), vec![1, 2, 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_count_never_exceeds_batch_or_ceiling() {
    for (batch, concurrent) in [(1u64, 4usize), (2, 2), (5, 3), (8, 1)] {
        let store = Arc::new(CountingStore::with_bookmarks(bookmarks(batch)));
        let processor = Arc::new(ScriptedProcessor::new().with_delay(Duration::from_millis(20)));

        cycle(&store, &processor, concurrent).run().await;

        let bound = (batch as usize).min(concurrent);
        assert!(
            processor.max_in_flight() <= bound,
            "batch {batch}, concurrent {concurrent}: {} in flight",
            processor.max_in_flight()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_item_is_attempted_exactly_once() {
    let store = Arc::new(CountingStore::with_bookmarks(bookmarks(25)));
    let processor = Arc::new(ScriptedProcessor::new().with_delay(Duration::from_millis(2)));

    let report = cycle(&store, &processor, 3).run().await;
    assert_eq!(report, ScanReport::Processed(25));

    let mut calls = processor.calls();
    calls.sort_unstable();
    assert_eq!(calls, (1..=25).collect::<Vec<_>>());
    // The cycle returned, so nothing may still be running.
    assert_eq!(processor.in_flight(), 0);
}

#[tokio::test]
async fn recoverable_failure_skips_only_that_save() {
    let store = Arc::new(CountingStore::with_bookmarks(bookmarks(3)));
    let processor = Arc::new(ScriptedProcessor::new().failing(2));

    let report = cycle(&store, &processor, 2).run().await;

    assert_eq!(report, ScanReport::Processed(3));
    assert_eq!(store.saved_ids(), vec![1, 3]);
    assert_eq!(store.saves(), 2);
    let failed = store.get(2).unwrap();
    assert!(!failed.has_archive);
    assert!(!failed.create_archive);
}

#[tokio::test]
async fn store_read_error_reports_failure_and_spawns_nothing() {
    let store = Arc::new(CountingStore::with_bookmarks(bookmarks(3)));
    store.fail_next_reads(1);
    let processor = Arc::new(ScriptedProcessor::new());
    let scan = cycle(&store, &processor, 2);

    let report = scan.run().await;
    assert_eq!(report, ScanReport::Failed);
    assert_eq!(report.as_count(), -1);
    assert_eq!(processor.call_count(), 0);
    assert_eq!(store.saves(), 0);

    // The next cycle recovers on its own.
    assert_eq!(scan.run().await, ScanReport::Processed(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fatal_and_panicking_items_do_not_stop_the_pool() {
    let store = Arc::new(CountingStore::with_bookmarks(bookmarks(6)));
    let processor = Arc::new(ScriptedProcessor::new().fatal(2).panicking(4));

    let report = cycle(&store, &processor, 2).run().await;

    assert_eq!(report, ScanReport::Processed(6));
    assert_eq!(processor.call_count(), 6);
    assert_eq!(store.saved_ids(), vec![1, 3, 5, 6]);
}

#[tokio::test]
async fn archived_bookmarks_are_not_rescanned() {
    let store = Arc::new(CountingStore::with_bookmarks(bookmarks(2)));
    let processor = Arc::new(ScriptedProcessor::new());
    let scan = cycle(&store, &processor, 2);

    assert_eq!(scan.run().await, ScanReport::Processed(2));
    assert_eq!(scan.run().await, ScanReport::Idle);
    assert_eq!(processor.call_count(), 2);
}

#[tokio::test]
async fn failed_items_are_retried_by_the_next_cycle() {
    let store = Arc::new(CountingStore::with_bookmarks(bookmarks(2)));
    store.fail_saves();
    let processor = Arc::new(ScriptedProcessor::new());
    let scan = cycle(&store, &processor, 1);

    assert_eq!(scan.run().await, ScanReport::Processed(2));
    assert_eq!(scan.run().await, ScanReport::Processed(2));
    assert_eq!(processor.call_count(), 4);
}
