use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("concurrent must be greater than zero")]
    NonPositiveConcurrency,
    #[error("scan interval must be greater than zero")]
    NonPositiveScanInterval,
}

/// Construction parameters for the background archiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiverOptions {
    /// Upper bound on simultaneously running archive workers.
    pub concurrent: usize,
    /// Period between scheduled scans.
    pub scan_interval: Duration,
}

impl Default for ArchiverOptions {
    fn default() -> Self {
        Self {
            concurrent: 2,
            scan_interval: Duration::from_secs(60),
        }
    }
}

impl ArchiverOptions {
    pub fn new(concurrent: usize, scan_interval: Duration) -> Result<Self, ConfigError> {
        let options = Self {
            concurrent,
            scan_interval,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrent == 0 {
            return Err(ConfigError::NonPositiveConcurrency);
        }
        if self.scan_interval.is_zero() {
            return Err(ConfigError::NonPositiveScanInterval);
        }
        Ok(())
    }

    /// Workers to spawn for a batch: never more than the batch, never more than the ceiling.
    pub fn worker_count(&self, batch_len: usize) -> usize {
        batch_len.min(self.concurrent)
    }
}
