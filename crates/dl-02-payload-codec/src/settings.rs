//! Values stored under settings addresses.

use prost::Message;
use shared_types::LedgerError;

/// Protobuf `Setting` as stored by the settings transaction processor.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Setting {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<SettingEntry>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SettingEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// Value of `key` inside a settings state entry.
///
/// Several settings can share one address, so the entry list is searched.
pub fn decode_setting_value(bytes: &[u8], key: &str) -> Result<String, LedgerError> {
    let setting =
        Setting::decode(bytes).map_err(|e| LedgerError::Decode(format!("setting {key}: {e}")))?;
    setting
        .entries
        .into_iter()
        .find(|entry| entry.key == key)
        .map(|entry| entry.value)
        .ok_or_else(|| LedgerError::NotFound(format!("setting {key}")))
}
