//! # State Reader (DL-06)
//!
//! Reads committed ledger state through the REST gateway and decodes it into
//! the records of `shared-types`.
//!
//! ## Reads
//!
//! - single address: `GET /state/{address}`, 404 is `NotFound`
//! - range: `GET /state?address={prefix}`, following `paging.next` until the
//!   last page. Every call starts from the current ledger head; no cursor is
//!   kept between calls.
//! - committed transaction payload: `GET /transactions/{id}`
//!
//! Multi-record accessors skip entries that fail to load or decode, log
//! them, and return the rest.

pub mod reader;

pub use reader::StateReader;
