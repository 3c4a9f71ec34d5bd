//! [`LedgerPort`] over the REST gateway: one transaction per batch, reads
//! through the state reader.

use crate::config::RuntimeConfig;
use crate::ports::LedgerPort;
use async_trait::async_trait;
use dl_03_transaction_builder::{DocumentTransactions, ProposalTransactions, SignedTransaction};
use dl_04_rest_gateway::RestGateway;
use dl_05_batch_submitter::{BatchSubmitter, SubmitOutcome};
use dl_06_state_reader::StateReader;
use dl_07_content_verifier::ContentVerifier;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{
    Deadline, DocumentKey, DocumentVersionRecord, LedgerError, NewProposal, ProposalRecord,
};
use tracing::info;

/// Ledger client built from the dl-* crates.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    submitter: BatchSubmitter,
    verifier: ContentVerifier,
}

impl LedgerClient {
    pub fn new(submitter: BatchSubmitter, reader: StateReader) -> Self {
        Self {
            submitter,
            verifier: ContentVerifier::new(reader),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self, LedgerError> {
        let gateway = RestGateway::new(&config.gateway())?;
        let submitter = BatchSubmitter::new(gateway.clone(), config.submitter())?;
        Ok(Self::new(submitter, StateReader::new(gateway)))
    }

    pub fn reader(&self) -> &StateReader {
        self.verifier.reader()
    }

    fn proposals(&self) -> ProposalTransactions<'_> {
        ProposalTransactions::new(self.reader().proposal_addresses())
    }

    fn documents(&self) -> DocumentTransactions<'_> {
        DocumentTransactions::new(self.reader().document_addresses())
    }

    async fn submit_one(
        &self,
        deadline: &Deadline,
        action: &'static str,
        transaction: SignedTransaction,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError> {
        let transaction_id = transaction.id().to_string();
        let outcome = self
            .submitter
            .submit_transactions(deadline, vec![transaction], signer)
            .await?;

        info!(
            action,
            transaction_id = %transaction_id,
            batch_id = %outcome.batch_id,
            status = %outcome.status,
            elapsed = ?outcome.elapsed,
            "Batch settled"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl LedgerPort for LedgerClient {
    async fn submit_proposal(
        &self,
        deadline: &Deadline,
        proposal: &NewProposal,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError> {
        let transaction = self.proposals().insert(proposal, signer)?;
        self.submit_one(deadline, "insert_proposal", transaction, signer).await
    }

    async fn vote(
        &self,
        deadline: &Deadline,
        proposal: &ProposalRecord,
        voter: &str,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError> {
        let transaction = self.proposals().vote(proposal, voter, signer)?;
        self.submit_one(deadline, "vote", transaction, signer).await
    }

    async fn remove_proposal(
        &self,
        deadline: &Deadline,
        proposal: &ProposalRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError> {
        let transaction = self.proposals().delete(proposal, signer)?;
        self.submit_one(deadline, "delete_proposal", transaction, signer).await
    }

    async fn submit_document_version(
        &self,
        deadline: &Deadline,
        version: &DocumentVersionRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError> {
        let transaction = self.documents().insert(version, signer)?;
        self.submit_one(deadline, "insert_document", transaction, signer).await
    }

    async fn invalidate_document_version(
        &self,
        deadline: &Deadline,
        version: &DocumentVersionRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError> {
        let transaction = self.documents().invalidate(version, signer)?;
        self.submit_one(deadline, "invalidate_document", transaction, signer).await
    }

    async fn proposal(&self, deadline: &Deadline, proposal_id: &str) -> Result<ProposalRecord, LedgerError> {
        self.reader().proposal(deadline, proposal_id).await
    }

    async fn verify_committed_proposal(
        &self,
        deadline: &Deadline,
        transaction_id: &str,
        content_hash: &str,
    ) -> Result<(), LedgerError> {
        self.verifier
            .verify_committed_proposal(deadline, transaction_id, content_hash)
            .await
    }

    async fn document_version(
        &self,
        deadline: &Deadline,
        key: &DocumentKey,
        version: u32,
    ) -> Result<DocumentVersionRecord, LedgerError> {
        let address = self.reader().document_addresses().document_version(key, version)?;
        self.reader().state(deadline, address.as_str()).await
    }

    async fn active_proposals(&self, deadline: &Deadline) -> Result<Vec<ProposalRecord>, LedgerError> {
        self.reader().active_proposals(deadline).await
    }

    async fn user_proposals(&self, deadline: &Deadline, user_id: &str) -> Result<Vec<ProposalRecord>, LedgerError> {
        self.reader().user_proposals(deadline, user_id).await
    }

    async fn document_proposals(
        &self,
        deadline: &Deadline,
        key: &DocumentKey,
    ) -> Result<Vec<(String, String)>, LedgerError> {
        self.reader().document_proposals(deadline, key).await
    }

    async fn document_versions(
        &self,
        deadline: &Deadline,
        key: &DocumentKey,
    ) -> Result<Vec<DocumentVersionRecord>, LedgerError> {
        self.reader().document_versions(deadline, key).await
    }

    async fn documents_of_author(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<DocumentVersionRecord>, LedgerError> {
        self.reader().documents_of_author(deadline, user_id).await
    }

    async fn documents_signed_by(
        &self,
        deadline: &Deadline,
        user_id: &str,
    ) -> Result<Vec<DocumentVersionRecord>, LedgerError> {
        self.reader().documents_signed_by(deadline, user_id).await
    }
}
