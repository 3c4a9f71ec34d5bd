//! Addresses of the ledger's settings family.
//!
//! `000000` followed by four 16-char SHA-256 segments, one per dot-separated
//! part of the setting name. Names with fewer than four parts hash the empty
//! string for the missing ones; a fifth or later part stays in the fourth.

use crate::address::Address;
use shared_crypto::sha256_hex;

/// Namespace of the settings family.
pub const SETTINGS_NAMESPACE: &str = "000000";
/// Setting holding the number of votes a proposal needs.
pub const VOTE_THRESHOLD_SETTING: &str = "proposal.vote.threshold";

const PART_COUNT: usize = 4;
const PART_WIDTH: usize = 16;

/// Address of the setting `name`.
pub fn setting_address(name: &str) -> Address {
    let mut parts: Vec<&str> = name.splitn(PART_COUNT, '.').collect();
    parts.resize(PART_COUNT, "");

    let mut out = String::from(SETTINGS_NAMESPACE);
    for part in parts {
        out.push_str(&sha256_hex(part.as_bytes())[..PART_WIDTH]);
    }
    Address(out)
}
