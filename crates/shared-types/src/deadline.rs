//! # Call Deadlines
//!
//! Every request-driven network call takes a [`Deadline`]. The deadline bounds
//! the call; cancellation is dropping the returned future.

use crate::errors::LedgerError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Point in time after which a call must give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// The earlier of this deadline and `timeout` from now.
    pub fn tightened(self, timeout: Duration) -> Self {
        self.min(Self::after(timeout))
    }

    /// Run `fut` until it finishes or the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::DeadlineExceeded),
        }
    }
}
