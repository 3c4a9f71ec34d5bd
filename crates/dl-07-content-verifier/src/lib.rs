//! # Content Verifier (DL-07)
//!
//! Recomputes the SHA-512 digest of off-chain content and compares it with
//! the digest recorded on the ledger. The same digest is written when the
//! content is first submitted, so any difference means the off-chain copy
//! changed.
//!
//! What happens on a mismatch is up to the caller: document versions are
//! marked invalid, unconfirmed proposals are removed.

pub mod verifier;

pub use verifier::{
    check_proposal, check_version, content_digest, verify, ContentVerifier, Verification, CONTENT_HASH_FIELD,
};
