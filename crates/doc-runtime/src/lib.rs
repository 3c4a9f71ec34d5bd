//! # Doc Runtime
//!
//! Orchestration of the document-approval flow on top of the ledger crates.
//!
//! ## Architecture
//!
//! ```text
//!  requests ──→ DocumentWorkflow ──→ LedgerPort ──→ LedgerClient (dl-03..dl-07)
//!                   │    │
//!                   │    └──→ SigningKeyProvider
//!                   └──→ ContentStore
//!
//!  validator events ──→ EventListener (dl-08) ──→ ProposalAcceptedHandler ──→ DocumentWorkflow
//! ```
//!
//! The ledger owns all state. The content store holds the bytes whose
//! digests the ledger records; the workflow keeps the two consistent.

pub mod adapters;
pub mod config;
pub mod events;
pub mod logging;
pub mod ports;
pub mod runtime;
pub mod workflow;

pub use adapters::{InMemoryContentStore, InMemoryKeyProvider, LedgerClient};
pub use config::{ConfigError, RuntimeConfig};
pub use events::{ProposalAcceptedHandler, PROPOSAL_ACCEPTED};
pub use logging::init_logging;
pub use ports::{ContentKey, ContentStore, KeyError, LedgerPort, SigningKeyProvider, StoreError};
pub use runtime::DocRuntime;
pub use workflow::{
    DocumentWorkflow, ProposalDraft, ProposalReceipt, VerifiedDocument, VerifiedProposal, WorkflowError,
};
