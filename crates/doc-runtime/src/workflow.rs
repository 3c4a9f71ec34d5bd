//! # Document Workflow
//!
//! Request-driven and event-driven operations over the ledger, the off-chain
//! content store and the key provider.
//!
//! ## Write path
//!
//! Content is stored off-chain first, then the transaction is submitted.
//! Any failure after the store write deletes the content again:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | `COMMITTED` | success |
//! | `INVALID` | content deleted, [`LedgerError::Rejected`] |
//! | `PENDING` / `UNKNOWN`, change visible on the ledger | success |
//! | `PENDING` / `UNKNOWN`, change not visible | content deleted, [`LedgerError::Unconfirmed`] |
//!
//! A proposal counts as visible once its transaction is committed with the
//! submitted content digest; a document version once its state can be read.
//! | submission error | content deleted, error returned |
//!
//! ## Read path
//!
//! Records read from the ledger are paired with their off-chain content and
//! checked against the recorded digest. Records whose content cannot be read
//! are skipped. Mismatching proposals are deleted off-chain and removed
//! on-chain; mismatching document versions are invalidated on-chain. Both
//! compensations sign with the application key and never fail the read.

use crate::ports::{ContentKey, ContentStore, KeyError, LedgerPort, SigningKeyProvider, StoreError};
use dl_05_batch_submitter::{BatchStatus, SubmitOutcome};
use dl_07_content_verifier::{check_proposal, check_version, content_digest};
use futures::future::join_all;
use shared_types::{
    next_document_version, Deadline, DocumentKey, DocumentStatus, DocumentVersionRecord, ErrorKind,
    LedgerError, NewProposal, ProposalRecord,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Workflow failures.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Keys(#[from] KeyError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Store(StoreError::NotFound(_)) | Self::Keys(KeyError::UnknownUser(_)) => ErrorKind::NotFound,
            Self::Store(StoreError::Backend(_)) | Self::Keys(KeyError::Backend(_)) => ErrorKind::Transport,
        }
    }

    pub fn ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(e) => Some(e),
            _ => None,
        }
    }
}

/// A new proposal as requested by its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalDraft {
    pub document: DocumentKey,
    pub author: String,
    pub content: Vec<u8>,
    /// Status the document takes once accepted. Defaults to active.
    pub proposed_status: Option<DocumentStatus>,
}

impl ProposalDraft {
    /// Draft proposing `content` as the next active version of `document`.
    pub fn new(document: DocumentKey, author: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            document,
            author: author.into(),
            content: content.into(),
            proposed_status: None,
        }
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.proposed_status = Some(status);
        self
    }
}

/// A submitted proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalReceipt {
    pub proposal_id: String,
    pub content_hash: String,
    pub batch_id: String,
    /// Committed, or pending/unknown with the proposal transaction already committed.
    pub status: BatchStatus,
}

/// A proposal together with content that matches its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedProposal {
    pub record: ProposalRecord,
    pub content: Vec<u8>,
}

/// A document version together with content that matches its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDocument {
    pub record: DocumentVersionRecord,
    pub content: Vec<u8>,
}

/// State written by a submission, probed when the batch outcome is ambiguous.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Proposal { proposal_id: &'a str, content_hash: &'a str },
    Version(&'a DocumentKey, u32),
}

/// Orchestrates proposals and document versions.
#[derive(Clone)]
pub struct DocumentWorkflow {
    ledger: Arc<dyn LedgerPort>,
    store: Arc<dyn ContentStore>,
    keys: Arc<dyn SigningKeyProvider>,
    operation_timeout: Duration,
}

impl DocumentWorkflow {
    pub fn new(
        ledger: Arc<dyn LedgerPort>,
        store: Arc<dyn ContentStore>,
        keys: Arc<dyn SigningKeyProvider>,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            store,
            keys,
            operation_timeout,
        }
    }

    /// Fresh deadline for one operation.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.operation_timeout)
    }

    // =========================================================================
    // Proposals
    // =========================================================================

    /// Propose new content for a document.
    ///
    /// Rejected with [`LedgerError::ProposalExists`] when an open proposal of
    /// the same document already carries the same content.
    pub async fn add_proposal(&self, deadline: &Deadline, draft: ProposalDraft) -> Result<ProposalReceipt, WorkflowError> {
        let proposed_status = draft.proposed_status.unwrap_or(DocumentStatus::Active);
        if proposed_status == DocumentStatus::Invalid {
            return Err(LedgerError::InvalidInput("a proposal cannot propose an invalid document".into()).into());
        }
        if draft.document.name.is_empty() {
            return Err(LedgerError::InvalidInput("document name is empty".into()).into());
        }

        let content_hash = content_digest(&draft.content);
        self.ensure_unique_content(deadline, &draft.document, &content_hash).await?;

        let signer = self.keys.signing_key(&draft.author).await?;
        let proposal = NewProposal {
            proposal_id: Uuid::new_v4().to_string(),
            document: draft.document,
            author: draft.author,
            content_hash,
            proposed_status,
        };

        let key = ContentKey::proposal(&proposal.proposal_id);
        self.store.put(&key, draft.content).await?;
        debug!(proposal_id = %proposal.proposal_id, "Proposal content stored");

        let submitted = self.ledger.submit_proposal(deadline, &proposal, &signer).await;
        let outcome = self
            .settle(
                deadline,
                submitted,
                &key,
                Target::Proposal {
                    proposal_id: &proposal.proposal_id,
                    content_hash: &proposal.content_hash,
                },
            )
            .await?;

        info!(
            proposal_id = %proposal.proposal_id,
            document = %proposal.document,
            batch_id = %outcome.batch_id,
            "Proposal added"
        );
        Ok(ProposalReceipt {
            proposal_id: proposal.proposal_id,
            content_hash: proposal.content_hash,
            batch_id: outcome.batch_id,
            status: outcome.status,
        })
    }

    async fn ensure_unique_content(
        &self,
        deadline: &Deadline,
        document: &DocumentKey,
        content_hash: &str,
    ) -> Result<(), LedgerError> {
        match self.ledger.document_proposals(deadline, document).await {
            Ok(open) => match open.into_iter().find(|(_, hash)| hash == content_hash) {
                Some((proposal_id, _)) => Err(LedgerError::ProposalExists { proposal_id }),
                None => Ok(()),
            },
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => {
                warn!(document = %document, error = %e, "Duplicate content check failed, continuing");
                Ok(())
            }
        }
    }

    /// Vote for a proposal as `user_id`.
    pub async fn sign_proposal(
        &self,
        deadline: &Deadline,
        proposal_id: &str,
        user_id: &str,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let signer = self.keys.signing_key(user_id).await?;
        let proposal = self.ledger.proposal(deadline, proposal_id).await?;
        if !proposal.is_active() {
            return Err(LedgerError::InvalidInput(format!(
                "proposal {proposal_id} is {}",
                proposal.current_status.as_str()
            ))
            .into());
        }

        let outcome = self
            .ledger
            .vote(deadline, &proposal, user_id, &signer)
            .await?
            .into_committed()?;
        debug!(proposal_id, user_id, batch_id = %outcome.batch_id, "Proposal signed");
        Ok(outcome)
    }

    /// Active proposals of other authors that `user_id` may sign.
    pub async fn proposals_to_sign(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<VerifiedProposal>, WorkflowError> {
        let candidates = self
            .ledger
            .active_proposals(deadline)
            .await?
            .into_iter()
            .filter(|proposal| proposal.author != user_id)
            .collect();
        Ok(self.verified_proposals(candidates).await)
    }

    /// Proposals `user_id` takes part in. A user with no record has none.
    pub async fn user_proposals(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<VerifiedProposal>, WorkflowError> {
        let proposals = match self.ledger.user_proposals(deadline, user_id).await {
            Ok(proposals) => proposals,
            Err(e) if e.is_not_found() => {
                debug!(user_id, "User has no proposals");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(self.verified_proposals(proposals).await)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    pub async fn document_versions(
        &self,
        deadline: &Deadline,
        document: &DocumentKey,
    ) -> Result<Vec<VerifiedDocument>, WorkflowError> {
        let versions = self.ledger.document_versions(deadline, document).await?;
        Ok(self.verified_documents(versions).await)
    }

    pub async fn documents_of_author(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<VerifiedDocument>, WorkflowError> {
        let versions = self.ledger.documents_of_author(deadline, user_id).await?;
        Ok(self.verified_documents(versions).await)
    }

    pub async fn documents_signed_by(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<VerifiedDocument>, WorkflowError> {
        let versions = self.ledger.documents_signed_by(deadline, user_id).await?;
        Ok(self.verified_documents(versions).await)
    }

    /// Commit the content of an accepted proposal as the next document version.
    ///
    /// `data` is the proposal id carried by the `proposal_accepted` event.
    pub async fn handle_proposal_accepted(&self, data: &[u8]) -> Result<DocumentVersionRecord, WorkflowError> {
        let proposal_id = std::str::from_utf8(data)
            .map_err(|e| LedgerError::InvalidInput(format!("proposal id is not UTF-8: {e}")))?
            .trim();
        if proposal_id.is_empty() {
            return Err(LedgerError::InvalidInput("event carries no proposal id".into()).into());
        }

        let deadline = self.deadline();
        let proposal = self.ledger.proposal(&deadline, proposal_id).await?;
        let verified = self.verify_proposal(proposal).await?;
        let proposal = verified.record;
        let document = proposal.document_key();

        let existing = match self.ledger.document_versions(&deadline, &document).await {
            Ok(versions) => versions,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let version = next_document_version(existing.iter().map(|v| v.version));

        let record = DocumentVersionRecord {
            proposal_id: proposal.proposal_id,
            category: document.category.clone(),
            document_name: document.name.clone(),
            content_hash: proposal.content_hash,
            status: proposal.proposed_doc_status,
            author: proposal.author,
            version,
            signers: proposal.signers,
        };

        let signer = self.keys.app_key().await?;
        let key = ContentKey::document(document.clone(), version);
        self.store.put(&key, verified.content).await?;

        let submitted = self.ledger.submit_document_version(&deadline, &record, &signer).await;
        let outcome = self
            .settle(&deadline, submitted, &key, Target::Version(&document, version))
            .await?;

        info!(
            proposal_id = %record.proposal_id,
            document = %document,
            version,
            batch_id = %outcome.batch_id,
            "Document version committed"
        );
        Ok(record)
    }

    // =========================================================================
    // Submission outcomes
    // =========================================================================

    /// Map a submission to success or failure, deleting `key` on failure.
    async fn settle(
        &self,
        deadline: &Deadline,
        submitted: Result<SubmitOutcome, LedgerError>,
        key: &ContentKey,
        target: Target<'_>,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let outcome = match submitted {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(content = %key, error = %e, "Submission failed");
                self.discard(key).await;
                return Err(e.into());
            }
        };

        let ambiguous = matches!(outcome.status, BatchStatus::Pending | BatchStatus::Unknown);
        if ambiguous && self.landed(deadline, &outcome, target).await {
            info!(
                batch_id = %outcome.batch_id,
                status = %outcome.status,
                "Batch unconfirmed but its state is present"
            );
            return Ok(outcome);
        }

        match outcome.into_committed() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(content = %key, error = %e, "Batch not committed");
                self.discard(key).await;
                Err(e.into())
            }
        }
    }

    /// Whether an unconfirmed submission took effect: a proposal's transaction
    /// is committed with the submitted digest, a document version is readable.
    async fn landed(&self, deadline: &Deadline, outcome: &SubmitOutcome, target: Target<'_>) -> bool {
        let read = match target {
            Target::Proposal {
                proposal_id,
                content_hash,
            } => match outcome.transaction_ids.first() {
                Some(transaction_id) => {
                    debug!(proposal_id, transaction_id = %transaction_id, "Checking committed proposal transaction");
                    self.ledger
                        .verify_committed_proposal(deadline, transaction_id, content_hash)
                        .await
                }
                None => Err(LedgerError::Protocol(format!("batch {} has no transactions", outcome.batch_id))),
            },
            Target::Version(key, version) => self
                .ledger
                .document_version(deadline, key, version)
                .await
                .map(drop),
        };
        if let Err(e) = &read {
            debug!(?target, error = %e, "Submitted state not readable");
        }
        read.is_ok()
    }

    async fn discard(&self, key: &ContentKey) {
        match self.store.delete(key).await {
            Ok(()) => debug!(content = %key, "Tentative content deleted"),
            Err(e) => error!(content = %key, error = %e, "Failed to delete tentative content"),
        }
    }

    // =========================================================================
    // Verification
    // =========================================================================

    async fn verified_proposals(&self, proposals: Vec<ProposalRecord>) -> Vec<VerifiedProposal> {
        let total = proposals.len();
        let verified: Vec<_> = join_all(proposals.into_iter().map(|p| self.verify_proposal(p)))
            .await
            .into_iter()
            .filter_map(Result::ok)
            .collect();
        info!(verified = verified.len(), total, "Proposal content checked");
        verified
    }

    async fn verify_proposal(&self, proposal: ProposalRecord) -> Result<VerifiedProposal, WorkflowError> {
        let key = ContentKey::proposal(&proposal.proposal_id);
        let content = self.store.get(&key).await.inspect_err(|e| {
            error!(proposal_id = %proposal.proposal_id, error = %e, "Proposal content unavailable");
        })?;

        match check_proposal(&proposal, &content) {
            Ok(()) => Ok(VerifiedProposal {
                record: proposal,
                content,
            }),
            Err(e) => {
                warn!(proposal_id = %proposal.proposal_id, "Removing tampered proposal");
                self.remove_tampered_proposal(&proposal, &key).await;
                Err(e.into())
            }
        }
    }

    async fn remove_tampered_proposal(&self, proposal: &ProposalRecord, key: &ContentKey) {
        if let Err(e) = self.store.delete(key).await {
            error!(proposal_id = %proposal.proposal_id, error = %e, "Failed to delete proposal content");
        }

        let signer = match self.keys.app_key().await {
            Ok(signer) => signer,
            Err(e) => {
                error!(error = %e, "App key unavailable, proposal stays on-chain");
                return;
            }
        };
        let removed = self
            .ledger
            .remove_proposal(&self.deadline(), proposal, &signer)
            .await
            .and_then(SubmitOutcome::into_committed);
        if let Err(e) = removed {
            error!(proposal_id = %proposal.proposal_id, error = %e, "Failed to remove proposal on-chain");
        }
    }

    async fn verified_documents(&self, versions: Vec<DocumentVersionRecord>) -> Vec<VerifiedDocument> {
        let total = versions.len();
        let verified: Vec<_> = join_all(versions.into_iter().map(|v| self.verify_document(v)))
            .await
            .into_iter()
            .flatten()
            .collect();
        info!(verified = verified.len(), total, "Document content checked");
        verified
    }

    async fn verify_document(&self, version: DocumentVersionRecord) -> Option<VerifiedDocument> {
        let key = ContentKey::document(version.document_key(), version.version);
        let content = match self.store.get(&key).await {
            Ok(content) => content,
            Err(e) => {
                error!(content = %key, error = %e, "Document content unavailable");
                return None;
            }
        };

        if check_version(&version, &content).is_ok() {
            return Some(VerifiedDocument {
                record: version,
                content,
            });
        }

        warn!(content = %key, "Invalidating tampered document version");
        self.invalidate_tampered_document(&version).await;
        None
    }

    /// The tampered content stays in the store for audit.
    async fn invalidate_tampered_document(&self, version: &DocumentVersionRecord) {
        if version.status == DocumentStatus::Invalid {
            debug!(document = %version.document_key(), version = version.version, "Already invalid");
            return;
        }

        let signer = match self.keys.app_key().await {
            Ok(signer) => signer,
            Err(e) => {
                error!(error = %e, "App key unavailable, document stays valid on-chain");
                return;
            }
        };
        let invalidated = self
            .ledger
            .invalidate_document_version(&self.deadline(), version, &signer)
            .await
            .and_then(SubmitOutcome::into_committed);
        if let Err(e) = invalidated {
            error!(
                document = %version.document_key(),
                version = version.version,
                error = %e,
                "Failed to invalidate document version"
            );
        }
    }
}
