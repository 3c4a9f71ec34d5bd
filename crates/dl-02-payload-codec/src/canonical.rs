//! Canonical CBOR encoding.
//!
//! Map keys are ordered by the length of their encoded form, then bytewise
//! (RFC 7049 §3.9). Integers and lengths use the shortest header. Two
//! implementations encoding the same mapping therefore produce the same
//! bytes, and the same `payload_sha512`.

use crate::fields::{FieldValue, PayloadFields};
use ciborium::Value;
use serde::{de::DeserializeOwned, Serialize};
use shared_crypto::sha512_hex;
use shared_types::LedgerError;
use std::collections::BTreeMap;

/// Encode a field mapping as a canonical CBOR map.
pub fn encode(fields: &PayloadFields) -> Result<Vec<u8>, LedgerError> {
    let entries = fields
        .iter()
        .map(|(name, value)| (Value::Text(name.to_string()), to_value(value)))
        .collect();
    write(canonicalize(Value::Map(entries))?)
}

/// Decode a CBOR map back into fields.
pub fn decode(bytes: &[u8]) -> Result<PayloadFields, LedgerError> {
    let Value::Map(entries) = read(bytes)? else {
        return Err(LedgerError::Decode("payload is not a CBOR map".into()));
    };

    let mut fields = PayloadFields::new();
    for (key, value) in entries {
        let Value::Text(name) = key else {
            return Err(LedgerError::Decode(format!("non-text payload key {key:?}")));
        };
        let value = from_value(&name, value)?;
        fields.insert(name, value);
    }
    Ok(fields)
}

/// Encode any serializable record, with canonical key order.
pub fn encode_record<T: Serialize>(record: &T) -> Result<Vec<u8>, LedgerError> {
    let mut raw = Vec::new();
    ciborium::into_writer(record, &mut raw).map_err(|e| LedgerError::Encode(e.to_string()))?;
    write(canonicalize(read(&raw)?)?)
}

/// Decode a CBOR state record into its typed form.
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LedgerError> {
    ciborium::from_reader(bytes).map_err(|e| LedgerError::Decode(format!("state record: {e}")))
}

/// Digest written into a transaction header for `payload`.
pub fn payload_sha512(payload: &[u8]) -> String {
    sha512_hex(payload)
}

fn to_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(text) => Value::Text(text.clone()),
        FieldValue::Unsigned(n) => Value::Integer((*n).into()),
        FieldValue::Signed(n) => Value::Integer((*n).into()),
        FieldValue::Bool(flag) => Value::Bool(*flag),
        FieldValue::Bytes(bytes) => Value::Bytes(bytes.clone()),
        FieldValue::TextList(items) => {
            Value::Array(items.iter().cloned().map(Value::Text).collect())
        }
        FieldValue::TextMap(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (Value::Text(k.clone()), Value::Text(v.clone())))
                .collect(),
        ),
    }
}

fn from_value(name: &str, value: Value) -> Result<FieldValue, LedgerError> {
    let unsupported = |what: &str| LedgerError::Decode(format!("field {name}: unsupported {what}"));

    match value {
        Value::Text(text) => Ok(FieldValue::Text(text)),
        Value::Bool(flag) => Ok(FieldValue::Bool(flag)),
        Value::Bytes(bytes) => Ok(FieldValue::Bytes(bytes)),
        Value::Integer(n) => {
            let wide = i128::from(n);
            if let Ok(unsigned) = u64::try_from(wide) {
                Ok(FieldValue::Unsigned(unsigned))
            } else {
                i64::try_from(wide)
                    .map(FieldValue::Signed)
                    .map_err(|_| unsupported("integer width"))
            }
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Text(text) => Ok(text),
                _ => Err(unsupported("list element")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::TextList),
        Value::Map(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                (Value::Text(k), Value::Text(v)) => Ok((k, v)),
                _ => Err(unsupported("map entry")),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(FieldValue::TextMap),
        _ => Err(unsupported("value type")),
    }
}

/// Recursively sort map entries into canonical order.
fn canonicalize(value: Value) -> Result<Value, LedgerError> {
    match value {
        Value::Map(entries) => {
            let mut keyed = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let key = canonicalize(key)?;
                let encoded_key = write(key.clone())?;
                keyed.push((encoded_key, key, canonicalize(value)?));
            }
            keyed.sort_by(|a, b| a.0.len().cmp(&b.0.len()).then_with(|| a.0.cmp(&b.0)));
            Ok(Value::Map(keyed.into_iter().map(|(_, k, v)| (k, v)).collect()))
        }
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .map(canonicalize)
                .collect::<Result<_, _>>()?,
        )),
        Value::Tag(tag, inner) => Ok(Value::Tag(tag, Box::new(canonicalize(*inner)?))),
        other => Ok(other),
    }
}

fn write(value: Value) -> Result<Vec<u8>, LedgerError> {
    let mut out = Vec::new();
    ciborium::into_writer(&value, &mut out).map_err(|e| LedgerError::Encode(e.to_string()))?;
    Ok(out)
}

fn read(bytes: &[u8]) -> Result<Value, LedgerError> {
    ciborium::from_reader(bytes).map_err(|e| LedgerError::Decode(format!("cbor: {e}")))
}
