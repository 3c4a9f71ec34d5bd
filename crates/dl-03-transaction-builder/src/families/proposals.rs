//! `proposals` family transactions.

use super::dedup;
use crate::transaction::{Action, FamilyDescriptor, SignedTransaction, TransactionBuilder};
use dl_01_address_codec::{setting_address, ProposalAddresses, VOTE_THRESHOLD_SETTING};
use dl_02_payload_codec::PayloadFields;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{LedgerError, NewProposal, ProposalRecord};

/// Builds proposal transactions against one set of family addresses.
#[derive(Debug, Clone, Copy)]
pub struct ProposalTransactions<'a> {
    addresses: &'a ProposalAddresses,
    builder: TransactionBuilder,
}

impl ProposalTransactions<'static> {
    pub fn global() -> Self {
        Self::new(ProposalAddresses::global())
    }
}

impl<'a> ProposalTransactions<'a> {
    pub fn new(addresses: &'a ProposalAddresses) -> Self {
        Self {
            addresses,
            builder: TransactionBuilder::new(FamilyDescriptor::PROPOSALS),
        }
    }

    /// Address of the record a proposal transaction targets.
    pub fn proposal_address(&self, proposal_id: &str) -> String {
        self.addresses.proposal(proposal_id).into_string()
    }

    /// Create a proposal. Touches the proposal, its author and the document index.
    pub fn insert(
        &self,
        proposal: &NewProposal,
        signer: &Secp256k1KeyPair,
    ) -> Result<SignedTransaction, LedgerError> {
        let fields = PayloadFields::new()
            .with("proposalID", &proposal.proposal_id)
            .with("category", &proposal.document.category)
            .with("docName", &proposal.document.name)
            .with("contentHash", &proposal.content_hash)
            .with("proposedStatus", proposal.proposed_status.as_str())
            .with("author", &proposal.author);

        let addresses = vec![
            self.proposal_address(&proposal.proposal_id),
            self.addresses.user(&proposal.author).into_string(),
            self.addresses.document(&proposal.document).into_string(),
        ];
        self.builder.build(Action::Insert, fields, addresses, signer)
    }

    /// Vote for a proposal. Also reads the vote threshold setting.
    pub fn vote(
        &self,
        proposal: &ProposalRecord,
        voter: &str,
        signer: &Secp256k1KeyPair,
    ) -> Result<SignedTransaction, LedgerError> {
        let fields = PayloadFields::new()
            .with("proposalID", &proposal.proposal_id)
            .with("voter", voter);

        let addresses = dedup(vec![
            self.proposal_address(&proposal.proposal_id),
            self.addresses.user(voter).into_string(),
            self.addresses.user(&proposal.author).into_string(),
            self.addresses.document(&proposal.document_key()).into_string(),
            setting_address(VOTE_THRESHOLD_SETTING).into_string(),
        ]);
        self.builder.build(Action::Vote, fields, addresses, signer)
    }

    /// Remove a proposal.
    pub fn delete(
        &self,
        proposal: &ProposalRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SignedTransaction, LedgerError> {
        let fields = PayloadFields::new().with("proposalID", &proposal.proposal_id);

        let addresses = vec![
            self.proposal_address(&proposal.proposal_id),
            self.addresses.user(&proposal.author).into_string(),
            self.addresses.document(&proposal.document_key()).into_string(),
        ];
        self.builder.build(Action::Delete, fields, addresses, signer)
    }
}
