//! # Transaction Builder (DL-03)
//!
//! Builds signed ledger transactions and wraps them into signed batches.
//!
//! ## Flow
//!
//! ```text
//! fields ──► canonical CBOR payload ──► TransactionHeader ──► sign ──► Transaction
//!                                                                          │
//!                            BatchList ◄── sign ◄── BatchHeader ◄──────────┘
//! ```
//!
//! The header signature is the transaction id; the batch header signature is
//! the batch id. Every header carries a fresh random nonce, so two builds of
//! the same payload never share an id.
//!
//! ## Address Declarations
//!
//! Inputs and outputs are the address set the caller passes. The builder does
//! not check completeness; the constructors in [`families`] declare the full
//! set for each action.

pub mod batch;
pub mod families;
pub mod proto;
pub mod transaction;

pub use batch::{BatchBuilder, SignedBatch};
pub use families::doctracker::DocumentTransactions;
pub use families::proposals::ProposalTransactions;
pub use transaction::{Action, FamilyDescriptor, SignedTransaction, TransactionBuilder};
