//! Listener configuration.

use crate::error::ListenerError;
use std::time::Duration;

/// Validator component port used for event subscriptions.
pub const DEFAULT_EVENT_PORT: u16 = 4004;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    pub validator_host: String,
    pub event_port: u16,
    /// How long a subscribe or unsubscribe request waits for its response.
    pub request_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            validator_host: "localhost".to_string(),
            event_port: DEFAULT_EVENT_PORT,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ListenerConfig {
    pub fn with_host(validator_host: impl Into<String>) -> Self {
        Self {
            validator_host: validator_host.into(),
            ..Self::default()
        }
    }

    /// ZeroMQ endpoint, `tcp://{host}:{port}`.
    pub fn endpoint(&self) -> String {
        format!("tcp://{}:{}", self.validator_host, self.event_port)
    }

    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.validator_host.trim().is_empty() {
            return Err(ListenerError::InvalidConfig("validator host is empty".into()));
        }
        if self.event_port == 0 {
            return Err(ListenerError::InvalidConfig("event port must be > 0".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(ListenerError::InvalidConfig("request timeout must be > 0".into()));
        }
        Ok(())
    }
}
