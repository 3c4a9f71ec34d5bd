//! `GET /batch_statuses` responses.

use serde::Deserialize;
use shared_types::LedgerError;
use std::fmt;

/// Status of a submitted batch as reported by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    Committed,
    Invalid,
    Pending,
    Unknown,
}

impl BatchStatus {
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        match raw {
            "COMMITTED" => Ok(Self::Committed),
            "INVALID" => Ok(Self::Invalid),
            "PENDING" => Ok(Self::Pending),
            "UNKNOWN" => Ok(Self::Unknown),
            other => Err(LedgerError::Decode(format!("unknown batch status {other:?}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "COMMITTED",
            Self::Invalid => "INVALID",
            Self::Pending => "PENDING",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Anything but `Pending` ends the polling loop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the validator rejected a transaction of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvalidTransaction {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

/// Status of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub batch_id: String,
    pub status: BatchStatus,
    pub invalid_transactions: Vec<InvalidTransaction>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    data: Vec<RawStatus>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    id: String,
    status: String,
    #[serde(default)]
    invalid_transactions: Vec<InvalidTransaction>,
}

impl StatusReport {
    /// Pick the entry for `batch_id` out of a status response.
    pub fn from_body(body: &[u8], batch_id: &str) -> Result<Self, LedgerError> {
        let envelope: StatusEnvelope = serde_json::from_slice(body)
            .map_err(|e| LedgerError::Decode(format!("batch status envelope: {e}")))?;

        let raw = envelope
            .data
            .into_iter()
            .find(|entry| entry.id == batch_id)
            .ok_or_else(|| LedgerError::Protocol(format!("no status for batch {batch_id}")))?;

        Ok(Self {
            status: BatchStatus::parse(&raw.status)?,
            batch_id: raw.id,
            invalid_transactions: raw.invalid_transactions,
        })
    }
}
