//! # Shared Crypto - Digest and Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-512, SHA-256 | Address segments, payload and content digests |
//! | `ecdsa` | secp256k1 | Transaction and batch header signing |
//!
//! All digests are rendered as lowercase hex, which is the form the ledger
//! expects in headers, addresses and recorded content hashes.
//!
//! The hash functions are pure: there is no process-wide hasher to
//! initialize before first use.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use hashing::{sha256_hex, sha512_hex, Sha512Hasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
