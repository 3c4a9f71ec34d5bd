//! # Outbound Ports
//!
//! Traits for the collaborators the workflow drives. Every ledger call takes
//! the caller's [`Deadline`].

use async_trait::async_trait;
use dl_05_batch_submitter::SubmitOutcome;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{
    Deadline, DocumentKey, DocumentVersionRecord, LedgerError, NewProposal, ProposalRecord,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Business key of a blob in the off-chain content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentKey {
    /// Content proposed under a proposal id.
    Proposal(String),
    /// Content of one committed document version.
    Document { key: DocumentKey, version: u32 },
}

impl ContentKey {
    pub fn proposal(proposal_id: impl Into<String>) -> Self {
        Self::Proposal(proposal_id.into())
    }

    pub fn document(key: DocumentKey, version: u32) -> Self {
        Self::Document { key, version }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proposal(id) => write!(f, "proposal:{id}"),
            Self::Document { key, version } => write!(f, "document:{key}@{version}"),
        }
    }
}

/// Content store failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No content stored under {0}")]
    NotFound(ContentKey),

    #[error("Content store failure: {0}")]
    Backend(String),
}

/// Off-chain content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, key: &ContentKey) -> Result<Vec<u8>, StoreError>;

    /// Store `content`, replacing whatever was under `key`.
    async fn put(&self, key: &ContentKey, content: Vec<u8>) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &ContentKey) -> Result<(), StoreError>;
}

/// Key provider failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("No signing key for user {0}")]
    UnknownUser(String),

    #[error("Key provider failure: {0}")]
    Backend(String),
}

/// Identity and signing-key provider.
#[async_trait]
pub trait SigningKeyProvider: Send + Sync {
    /// Key the user signs their own transactions with.
    async fn signing_key(&self, user_id: &str) -> Result<Arc<Secp256k1KeyPair>, KeyError>;

    /// Key of the application itself, used for compensating transactions and
    /// event-driven commits.
    async fn app_key(&self) -> Result<Arc<Secp256k1KeyPair>, KeyError>;
}

/// Submit and read surface of the ledger.
///
/// Submissions return the raw [`SubmitOutcome`]; the caller decides what a
/// pending or unknown batch means.
#[async_trait]
pub trait LedgerPort: Send + Sync {
    async fn submit_proposal(
        &self,
        deadline: &Deadline,
        proposal: &NewProposal,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError>;

    async fn vote(
        &self,
        deadline: &Deadline,
        proposal: &ProposalRecord,
        voter: &str,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError>;

    async fn remove_proposal(
        &self,
        deadline: &Deadline,
        proposal: &ProposalRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError>;

    async fn submit_document_version(
        &self,
        deadline: &Deadline,
        version: &DocumentVersionRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError>;

    async fn invalidate_document_version(
        &self,
        deadline: &Deadline,
        version: &DocumentVersionRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError>;

    async fn proposal(&self, deadline: &Deadline, proposal_id: &str) -> Result<ProposalRecord, LedgerError>;

    /// Whether the committed transaction `transaction_id` recorded
    /// `content_hash`. Fails with NotFound while the transaction is not
    /// committed and with a content mismatch when the digests differ.
    async fn verify_committed_proposal(
        &self,
        deadline: &Deadline,
        transaction_id: &str,
        content_hash: &str,
    ) -> Result<(), LedgerError>;

    async fn document_version(
        &self,
        deadline: &Deadline,
        key: &DocumentKey,
        version: u32,
    ) -> Result<DocumentVersionRecord, LedgerError>;

    async fn active_proposals(&self, deadline: &Deadline) -> Result<Vec<ProposalRecord>, LedgerError>;

    async fn user_proposals(&self, deadline: &Deadline, user_id: &str) -> Result<Vec<ProposalRecord>, LedgerError>;

    /// Open proposals of a document as `(proposal_id, content_hash)`.
    async fn document_proposals(
        &self,
        deadline: &Deadline,
        key: &DocumentKey,
    ) -> Result<Vec<(String, String)>, LedgerError>;

    async fn document_versions(
        &self,
        deadline: &Deadline,
        key: &DocumentKey,
    ) -> Result<Vec<DocumentVersionRecord>, LedgerError>;

    async fn documents_of_author(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<DocumentVersionRecord>, LedgerError>;

    async fn documents_signed_by(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<DocumentVersionRecord>, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_display() {
        assert_eq!(ContentKey::proposal("p1").to_string(), "proposal:p1");
        assert_eq!(
            ContentKey::document(DocumentKey::new("hr", "dash"), 3).to_string(),
            "document:hr/dash@3"
        );
    }
}
