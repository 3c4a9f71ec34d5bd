//! # Adapters
//!
//! - [`LedgerClient`]: [`LedgerPort`](crate::ports::LedgerPort) over the REST
//!   gateway crates.
//! - [`InMemoryContentStore`] and [`InMemoryKeyProvider`]: collaborator ports
//!   held in memory, for tests and local runs.

pub mod ledger;
pub mod memory;

pub use ledger::LedgerClient;
pub use memory::{InMemoryContentStore, InMemoryKeyProvider};
