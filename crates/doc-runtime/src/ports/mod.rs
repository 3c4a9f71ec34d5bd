//! # Ports
//!
//! Outbound dependencies of the workflow: off-chain content, signing keys and
//! the ledger itself.

pub mod outbound;

pub use outbound::*;
