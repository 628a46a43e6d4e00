use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ScanCycle;

/// Why the trigger loop woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Notified,
    Ticked,
}

/// Runs scan cycles on every tick and every notification until `stop` fires.
///
/// Cycles run inline, so they never overlap. A tick that comes due during a
/// cycle fires right after it; notifications during a cycle stay coalesced in
/// the single-slot wake channel. Returns the number of cycles run.
pub(crate) async fn run_trigger_loop(
    scan: Arc<ScanCycle>,
    interval: Duration,
    mut wake_rx: mpsc::Receiver<()>,
    stop: CancellationToken,
) -> u64 {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycles = 0;
    loop {
        let wake = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            Some(()) = wake_rx.recv() => Wake::Notified,
            _ = ticker.tick() => Wake::Ticked,
        };
        match wake {
            Wake::Notified => engine_debug!("scan wake up by notification"),
            Wake::Ticked => engine_debug!("scan wake up by ticker"),
        }

        let report = scan.run().await;
        cycles += 1;
        if !report.is_idle() {
            engine_info!("{}", report);
        }
    }
    cycles
}
