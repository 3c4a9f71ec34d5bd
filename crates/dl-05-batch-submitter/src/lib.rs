//! # Batch Submitter (DL-05)
//!
//! Posts a signed batch to the REST API and polls its status until the batch
//! reaches a terminal state or the bounded wait runs out.
//!
//! ## Timing
//!
//! - The wait window opens when the batch POST is issued and closes after
//!   `max_wait` or at the caller's deadline, whichever comes first.
//! - Each poll asks the server to hold the request for the remaining window
//!   (`wait = ceil(remaining seconds)`).
//! - Consecutive polls are at least `poll_interval` apart.
//!
//! ## Outcomes
//!
//! | Result | Meaning |
//! |--------|---------|
//! | `Err(_)` | Submission or polling failed; nothing is known to be committed |
//! | `Ok(status = Committed)` | Confirmed |
//! | `Ok(status = Invalid)` | Rejected by the ledger |
//! | `Ok(status = Pending / Unknown)` | Ambiguous; query state before assuming either way |

pub mod config;
pub mod status;
pub mod submitter;

pub use config::SubmitterConfig;
pub use status::{BatchStatus, InvalidTransaction, StatusReport};
pub use submitter::{BatchSubmitter, SubmitOutcome};
