//! # Payload Codec (DL-02)
//!
//! Binary payloads of the ledger's transaction processors and the JSON
//! envelopes the REST gateway wraps them in.
//!
//! ## Formats
//!
//! | Layer | Format |
//! |-------|--------|
//! | Transaction payload, state record | canonical CBOR map (RFC 7049 key order) |
//! | `GET /state/{address}` | `{"data": "<base64>"}` |
//! | `GET /state?address=` | `{"data": [{"address", "data"}], "paging": {"next"}}` |
//! | `GET /transactions/{id}` | `{"data": {"payload": "<base64>"}}` |
//! | Settings value | protobuf `Setting { repeated Entry }` |
//!
//! ## Errors
//!
//! An envelope without data is `LedgerError::NotFound`; anything malformed
//! is `LedgerError::Decode` (kind `Protocol`).

pub mod canonical;
pub mod envelope;
pub mod fields;
pub mod settings;

pub use canonical::{decode, decode_record, encode, encode_record, payload_sha512};
pub use envelope::{
    decode_state, decode_state_entry, decode_state_list, decode_transaction_payload, StateEntry,
    StateListPage,
};
pub use fields::{FieldValue, PayloadFields};
pub use settings::{decode_setting_value, Setting, SettingEntry};
