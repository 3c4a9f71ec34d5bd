//! # REST Gateway (DL-04)
//!
//! Thin client over the ledger's REST API, shared by the batch submitter and
//! the state reader. It owns URL construction, HTTP status mapping and the
//! per-call deadline; callers own body decoding.
//!
//! ## Status Mapping
//!
//! | Response | Result |
//! |----------|--------|
//! | 2xx | body bytes |
//! | 404 | `LedgerError::NotFound` |
//! | other | `LedgerError::HttpStatus` |
//! | connect / timeout / body failure | `LedgerError::Transport` |
//! | caller deadline passed | `LedgerError::DeadlineExceeded` |

pub mod client;
pub mod config;

pub use client::{RestGateway, BATCHES_PATH, BATCH_STATUSES_PATH, STATE_PATH, TRANSACTIONS_PATH};
pub use config::GatewayConfig;
