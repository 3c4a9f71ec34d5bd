//! # Doc-Ledger Test Suite
//!
//! Cross-crate flows against a mocked ledger REST API and an in-memory
//! validator connection.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # MockLedger: wiremock REST API that records batches
//! └── integration/
//!     ├── addressing.rs # Builders and readers agree on addresses
//!     ├── submission.rs # Batch wire format, bounded polling
//!     ├── proposals.rs  # Proposal workflow against the REST API
//!     ├── documents.rs  # Accepted proposals, document verification
//!     └── events.rs     # Listener delivery and shutdown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dl-tests
//! cargo test -p dl-tests integration::events
//! cargo bench -p dl-tests
//! ```

pub mod integration;
pub mod support;
