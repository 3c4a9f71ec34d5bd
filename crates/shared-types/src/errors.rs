//! # Error Types
//!
//! One error enum for the whole ledger integration layer. Every variant maps
//! to exactly one [`ErrorKind`], which is what callers branch on.

use shared_crypto::CryptoError;
use std::fmt;
use thiserror::Error;

/// Taxonomy of ledger failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Address or record absent. Expected; callers branch on it.
    NotFound,
    /// Malformed response, unexpected message type, decode failure.
    Protocol,
    /// Connection or HTTP failure. Retryable at the caller's discretion.
    Transport,
    /// Digest mismatch, invalid status transition, rejected input.
    Validation,
    /// A single event-type subscription failed.
    Subscription,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not_found",
            Self::Protocol => "protocol",
            Self::Transport => "transport",
            Self::Validation => "validation",
            Self::Subscription => "subscription",
        };
        f.write_str(name)
    }
}

/// Errors raised by address derivation, codecs, submission and state reads.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Nothing is stored at the requested address or id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payload or envelope could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Payload could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Peer spoke the protocol incorrectly.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Connection, timeout or body read failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response other than 404.
    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus { status: u16, url: String, body: String },

    /// The caller's deadline passed before the call completed.
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Batch was accepted but not confirmed before the wait elapsed.
    #[error("Batch {batch_id} not confirmed (last status {status})")]
    Unconfirmed { batch_id: String, status: String },

    /// The ledger marked the batch invalid.
    #[error("Batch {batch_id} rejected: {reason}")]
    Rejected { batch_id: String, reason: String },

    /// Off-chain content does not match the recorded digest.
    #[error("Content mismatch: recorded {expected}, computed {actual}")]
    ContentMismatch { expected: String, actual: String },

    /// A status change that the record's lifecycle does not allow.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// A proposal with identical content is already open for the document.
    #[error("Proposal with the same content already exists: {proposal_id}")]
    ProposalExists { proposal_id: String },

    /// Request data rejected before touching the ledger.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Key or signature failure.
    #[error("Signing error: {0}")]
    Signing(#[from] CryptoError),

    /// Subscribing to an event type failed.
    #[error("Subscription to {event_type} failed: {reason}")]
    Subscription { event_type: String, reason: String },
}

impl LedgerError {
    /// Taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Decode(_) | Self::Encode(_) | Self::Protocol(_) => ErrorKind::Protocol,
            Self::Transport(_)
            | Self::HttpStatus { .. }
            | Self::DeadlineExceeded
            | Self::Unconfirmed { .. } => ErrorKind::Transport,
            Self::Rejected { .. }
            | Self::ContentMismatch { .. }
            | Self::InvalidTransition { .. }
            | Self::ProposalExists { .. }
            | Self::InvalidInput(_)
            | Self::Signing(_) => ErrorKind::Validation,
            Self::Subscription { .. } => ErrorKind::Subscription,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Transport failures may be retried with a freshly built batch.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

/// Convenience alias used across the dl-* crates.
pub type LedgerResult<T> = Result<T, LedgerError>;
