//! Listener errors.

use shared_types::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Failures of the validator connection and the listener lifecycle.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Cannot connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connection to the validator closed")]
    Closed,

    /// Anything but an event list arrived on the event stream.
    #[error("Unexpected message type {0} on the event stream")]
    UnexpectedMessage(i32),

    #[error("Malformed {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("No response to {what} within {timeout:?}")]
    Timeout { what: &'static str, timeout: Duration },

    #[error("Subscription to {event_type} failed: {reason}")]
    Subscription { event_type: String, reason: String },

    #[error("Unsubscribe from {event_type} failed: {reason}")]
    Unsubscribe { event_type: String, reason: String },

    #[error("{} unsubscribe request(s) failed", .0.len())]
    Unsubscribes(Vec<ListenerError>),

    #[error("Invalid listener configuration: {0}")]
    InvalidConfig(String),

    #[error("Event listener is already running")]
    AlreadyRunning,

    #[error("Event listener is not running")]
    NotRunning,

    #[error("Listener task failed: {0}")]
    Task(String),
}

impl ListenerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect { .. } | Self::Transport(_) | Self::Closed | Self::Timeout { .. } => {
                ErrorKind::Transport
            }
            Self::UnexpectedMessage(_) | Self::Decode { .. } | Self::Task(_) => ErrorKind::Protocol,
            Self::Subscription { .. } | Self::Unsubscribe { .. } | Self::Unsubscribes(_) => {
                ErrorKind::Subscription
            }
            Self::InvalidConfig(_) | Self::AlreadyRunning | Self::NotRunning => ErrorKind::Validation,
        }
    }

    pub(crate) fn decode(what: &'static str, e: prost::DecodeError) -> Self {
        Self::Decode {
            what,
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_violation_kind() {
        assert_eq!(ListenerError::UnexpectedMessage(501).kind(), ErrorKind::Protocol);
        assert_eq!(ListenerError::Closed.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_aggregated_unsubscribe_message() {
        let err = ListenerError::Unsubscribes(vec![ListenerError::Closed, ListenerError::Closed]);
        assert_eq!(err.to_string(), "2 unsubscribe request(s) failed");
        assert_eq!(err.kind(), ErrorKind::Subscription);
    }
}
