//! Submitter configuration.

use shared_types::LedgerError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitterConfig {
    /// Total time to wait for a terminal status, counted from the POST.
    pub max_wait: Duration,
    /// Minimum spacing between status polls.
    pub poll_interval: Duration,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl SubmitterConfig {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.max_wait.is_zero() {
            return Err(LedgerError::InvalidInput("max_wait must be > 0".into()));
        }
        if self.poll_interval > self.max_wait {
            return Err(LedgerError::InvalidInput(
                "poll_interval must not exceed max_wait".into(),
            ));
        }
        Ok(())
    }
}
