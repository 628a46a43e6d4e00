use std::fmt;

use thiserror::Error;

/// Lifecycle of one archiver instance. Instances are single-use: a stopped
/// archiver is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Configured, trigger loop not spawned.
    #[default]
    Created,
    /// Trigger loop active, zero or more scans in flight.
    Running,
    /// Stop requested; waiting for the loop and any in-flight scan to finish.
    Stopping,
    /// Loop task and every worker have exited.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Start,
    StopRequested,
    LoopExited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} while {state}")]
pub struct LifecycleError {
    pub state: LifecycleState,
    pub event: LifecycleEvent,
}

impl LifecycleState {
    /// Pure transition function. Stopping a never-started instance goes
    /// straight to `Stopped` since there is nothing to wait for.
    pub fn apply(self, event: LifecycleEvent) -> Result<LifecycleState, LifecycleError> {
        use LifecycleEvent::*;
        use LifecycleState::*;

        match (self, event) {
            (Created, Start) => Ok(Running),
            (Created, StopRequested) => Ok(Stopped),
            (Running, StopRequested) => Ok(Stopping),
            (Stopping, LoopExited) => Ok(Stopped),
            (state, event) => Err(LifecycleError { state, event }),
        }
    }

    pub fn is_running(self) -> bool {
        self == LifecycleState::Running
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifecycleState::Created => "created",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}
