use std::fmt;

/// Result of one scan cycle, reported for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanReport {
    /// The store query failed; no workers were spawned.
    Failed,
    /// Nothing was eligible for archiving.
    Idle,
    /// This many items were attempted (not necessarily archived).
    Processed(usize),
}

impl ScanReport {
    /// Count form: negative sentinel on failure, zero when idle.
    pub fn as_count(self) -> i64 {
        match self {
            ScanReport::Failed => -1,
            ScanReport::Idle => 0,
            ScanReport::Processed(count) => i64::try_from(count).unwrap_or(i64::MAX),
        }
    }

    pub fn is_idle(self) -> bool {
        self == ScanReport::Idle
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanReport::Failed => write!(f, "scan failed"),
            ScanReport::Idle => write!(f, "scan nothing"),
            ScanReport::Processed(count) => write!(f, "scan complete: {count}"),
        }
    }
}
