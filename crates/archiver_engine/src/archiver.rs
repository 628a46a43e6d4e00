use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use archiver_core::{
    ArchiverNotifier, ArchiverOptions, ConfigError, LifecycleError, LifecycleEvent,
    LifecycleState,
};
use engine_logging::{engine_debug, engine_error, engine_info, engine_trace};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::trigger::run_trigger_loop;
use crate::{BookmarkProcessor, BookmarkStore, ScanCycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// Nothing was changed; `start` may be retried from inside a runtime.
    #[error("start called outside of a Tokio runtime")]
    NoRuntime,
}

struct Control {
    state: LifecycleState,
    wake_rx: Option<mpsc::Receiver<()>>,
    loop_task: Option<JoinHandle<u64>>,
}

/// Periodically archives every bookmark that has no archive yet.
///
/// Single-use: `start` once, `stop` once. Dropping a running archiver cancels
/// its trigger loop, but only [`BackgroundArchiver::stop`] waits for the
/// in-flight scan to finish.
pub struct BackgroundArchiver {
    scan: Arc<ScanCycle>,
    scan_interval: Duration,
    /// Capacity one: a burst of notifications collapses into one pending scan.
    wake_tx: mpsc::Sender<()>,
    stop: CancellationToken,
    control: Mutex<Control>,
}

impl BackgroundArchiver {
    pub fn new(
        store: Arc<dyn BookmarkStore>,
        processor: Arc<dyn BookmarkProcessor>,
        options: ArchiverOptions,
    ) -> Result<Self, ConfigError> {
        options.validate()?;
        let (wake_tx, wake_rx) = mpsc::channel(1);
        Ok(Self {
            scan: Arc::new(ScanCycle::new(store, processor, options)),
            scan_interval: options.scan_interval,
            wake_tx,
            stop: CancellationToken::new(),
            control: Mutex::new(Control {
                state: LifecycleState::Created,
                wake_rx: Some(wake_rx),
                loop_task: None,
            }),
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    /// Spawns the trigger loop on the current Tokio runtime and returns
    /// immediately.
    pub fn start(&self) -> Result<(), StartError> {
        let mut control = self.lock();
        let next = control.state.apply(LifecycleEvent::Start)?;
        let runtime = Handle::try_current().map_err(|_| StartError::NoRuntime)?;
        let Some(wake_rx) = control.wake_rx.take() else {
            return Err(StartError::Lifecycle(LifecycleError {
                state: control.state,
                event: LifecycleEvent::Start,
            }));
        };

        let scan = self.scan.clone();
        let interval = self.scan_interval;
        let stop = self.stop.clone();
        control.loop_task = Some(runtime.spawn(async move {
            engine_info!("scan worker started");
            let cycles = run_trigger_loop(scan, interval, wake_rx, stop).await;
            engine_info!("scan worker stopped after {} cycles", cycles);
            cycles
        }));
        control.state = next;

        engine_info!("background archiver started");
        Ok(())
    }

    /// Requests an out-of-cycle scan without blocking.
    ///
    /// Collapses into an already pending request, and is ignored once the
    /// trigger loop has exited.
    pub fn notify(&self) {
        match self.wake_tx.try_send(()) {
            Ok(()) => engine_debug!("notify background archiver"),
            Err(TrySendError::Full(())) => engine_trace!("archiver wake-up already pending"),
            Err(TrySendError::Closed(())) => engine_trace!("archiver no longer listening"),
        }
    }

    /// Stops the trigger loop and waits until it and any in-flight scan,
    /// including that scan's workers, have exited.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let loop_task = {
            let mut control = self.lock();
            control.state = control.state.apply(LifecycleEvent::StopRequested)?;
            control.loop_task.take()
        };

        engine_info!("background archiver stopping...");
        self.stop.cancel();

        if let Some(loop_task) = loop_task {
            if let Err(err) = loop_task.await {
                engine_error!("scan worker terminated abnormally: {}", err);
            }
            let mut control = self.lock();
            control.state = control.state.apply(LifecycleEvent::LoopExited)?;
        }

        engine_info!("background archiver stopped");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ArchiverNotifier for BackgroundArchiver {
    fn notify(&self) {
        BackgroundArchiver::notify(self);
    }
}

impl Drop for BackgroundArchiver {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
