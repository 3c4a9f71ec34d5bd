//! # Shared Types Crate
//!
//! Records stored in ledger state, their statuses, the error taxonomy and the
//! deadline-bearing call context used by every request-driven operation.
//!
//! ## Design Principles
//!
//! - **Typed errors**: every failure carries an [`ErrorKind`] so callers branch
//!   on the kind, never on message text.
//! - **Ledger owns state**: records here are transient decodings of committed
//!   state; nothing in this crate persists them.
//! - **Cancellation by drop**: a [`Deadline`] bounds a future; dropping the
//!   future cancels the call.

pub mod deadline;
pub mod entities;
pub mod errors;

pub use deadline::Deadline;
pub use entities::*;
pub use errors::*;
