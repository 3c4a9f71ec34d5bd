//! JSON envelopes returned by the REST gateway.

use crate::canonical::decode_record;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize};
use shared_types::LedgerError;

#[derive(Debug, Deserialize)]
struct SingleEnvelope {
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<RawEntry>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    address: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionEnvelope {
    data: TransactionData,
}

#[derive(Debug, Deserialize)]
struct TransactionData {
    payload: String,
}

/// One record returned by a range read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub address: String,
    pub data: Vec<u8>,
}

impl StateEntry {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, LedgerError> {
        decode_record(&self.data)
    }
}

/// One page of a range read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateListPage {
    pub entries: Vec<StateEntry>,
    /// Absolute URL of the next page, if the gateway paginated.
    pub next: Option<String>,
}

/// Raw bytes of a single state entry (`{"data": "<base64>"}`).
pub fn decode_state_entry(body: &[u8]) -> Result<Vec<u8>, LedgerError> {
    let envelope: SingleEnvelope = parse_json(body, "state entry")?;
    match envelope.data {
        Some(data) if !data.is_empty() => decode_base64(&data, "state entry"),
        _ => Err(LedgerError::NotFound("state entry without data".into())),
    }
}

/// Typed record of a single state entry.
pub fn decode_state<T: DeserializeOwned>(body: &[u8]) -> Result<T, LedgerError> {
    decode_record(&decode_state_entry(body)?)
}

/// One page of `GET /state?address=`.
pub fn decode_state_list(body: &[u8]) -> Result<StateListPage, LedgerError> {
    let envelope: ListEnvelope = parse_json(body, "state list")?;
    let entries = envelope
        .data
        .into_iter()
        .map(|raw| {
            let data = decode_base64(&raw.data, &raw.address)?;
            Ok(StateEntry {
                address: raw.address,
                data,
            })
        })
        .collect::<Result<Vec<_>, LedgerError>>()?;

    Ok(StateListPage {
        entries,
        next: envelope
            .paging
            .and_then(|paging| paging.next)
            .filter(|next| !next.is_empty()),
    })
}

/// Payload bytes of `GET /transactions/{id}`.
pub fn decode_transaction_payload(body: &[u8]) -> Result<Vec<u8>, LedgerError> {
    let envelope: TransactionEnvelope = parse_json(body, "transaction")?;
    decode_base64(&envelope.data.payload, "transaction payload")
}

fn parse_json<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, LedgerError> {
    serde_json::from_slice(body).map_err(|e| LedgerError::Decode(format!("{what} envelope: {e}")))
}

fn decode_base64(data: &str, what: &str) -> Result<Vec<u8>, LedgerError> {
    STANDARD
        .decode(data)
        .map_err(|e| LedgerError::Decode(format!("{what}: invalid base64: {e}")))
}
