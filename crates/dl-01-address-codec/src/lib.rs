//! # Address Codec (DL-01)
//!
//! Derives the fixed-length hexadecimal state addresses used by the ledger's
//! transaction processors.
//!
//! ## Layout
//!
//! ```text
//! | namespace (6) | sub-prefix (6) | identity (58) |   = 70 hex chars
//! ```
//!
//! - namespace: first 6 chars of SHA-512(family name)
//! - sub-prefix: first 6 chars of SHA-512(record kind)
//! - identity: truncated SHA-512 of each key part, filling 58 chars
//!
//! Supplying no key parts yields the 12-char range prefix that selects every
//! record of one kind.
//!
//! ## Initialization
//!
//! A [`Namespace`] hashes its family name and sub-prefixes exactly once when
//! it is built. The application families expose a process-wide instance
//! through `global()` (backed by `OnceLock`), and can also be built explicitly
//! and passed around as a context object.

pub mod address;
pub mod doctracker;
pub mod proposals;
pub mod settings;

pub use address::{Address, Namespace, Segment, SubPrefix};
pub use address::{ADDRESS_LEN, IDENTITY_LEN, PREFIX_LEN, RANGE_PREFIX_LEN};
pub use doctracker::DocTrackerAddresses;
pub use proposals::ProposalAddresses;
pub use settings::{setting_address, VOTE_THRESHOLD_SETTING};
