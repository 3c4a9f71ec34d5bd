//! # SHA-2 Hashing
//!
//! One-way digests used across the ledger client.
//!
//! - SHA-512 (hex, 128 chars): address segments, `payload_sha512` in
//!   transaction headers, recorded content digests.
//! - SHA-256 (hex, 64 chars): settings-family address segments.

use sha2::{Digest, Sha256, Sha512};

/// Hex length of a SHA-512 digest.
pub const SHA512_HEX_LEN: usize = 128;

/// Stateful SHA-512 hasher for multi-part input.
#[derive(Clone, Default)]
pub struct Sha512Hasher {
    inner: Sha512,
}

impl Sha512Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha512::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return the digest as lowercase hex.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

/// SHA-512 of `data`, hex encoded.
pub fn sha512_hex(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// SHA-256 of `data`, hex encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
