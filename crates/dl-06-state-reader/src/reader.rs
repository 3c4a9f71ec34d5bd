//! Typed state accessors.

use dl_01_address_codec::{setting_address, DocTrackerAddresses, ProposalAddresses, VOTE_THRESHOLD_SETTING};
use dl_02_payload_codec::{
    decode_setting_value, decode_state, decode_state_entry, decode_state_list,
    decode_transaction_payload, StateEntry,
};
use dl_04_rest_gateway::RestGateway;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use shared_types::{
    Deadline, DocumentIndexRecord, DocumentKey, DocumentUserRecord, DocumentVersionRecord,
    LedgerError, ProposalRecord, ProposalUserRecord,
};
use std::collections::HashSet;
use tracing::{debug, error, warn};

/// Reads and decodes ledger state.
#[derive(Debug, Clone)]
pub struct StateReader {
    gateway: RestGateway,
    proposals: ProposalAddresses,
    documents: DocTrackerAddresses,
}

impl StateReader {
    /// Reader over the process-wide family addresses.
    pub fn new(gateway: RestGateway) -> Self {
        Self::with_addresses(
            gateway,
            ProposalAddresses::global().clone(),
            DocTrackerAddresses::global().clone(),
        )
    }

    pub fn with_addresses(
        gateway: RestGateway,
        proposals: ProposalAddresses,
        documents: DocTrackerAddresses,
    ) -> Self {
        Self {
            gateway,
            proposals,
            documents,
        }
    }

    pub fn proposal_addresses(&self) -> &ProposalAddresses {
        &self.proposals
    }

    pub fn document_addresses(&self) -> &DocTrackerAddresses {
        &self.documents
    }

    // ------------------------------------------------------------------
    // Raw reads
    // ------------------------------------------------------------------

    /// Raw bytes stored at `address`.
    pub async fn state_bytes(&self, deadline: &Deadline, address: &str) -> Result<Vec<u8>, LedgerError> {
        let body = self.gateway.state(deadline, address).await?;
        decode_state_entry(&body).map_err(|e| with_address(e, address))
    }

    /// Typed record stored at `address`.
    pub async fn state<T: DeserializeOwned>(&self, deadline: &Deadline, address: &str) -> Result<T, LedgerError> {
        let body = self.gateway.state(deadline, address).await?;
        decode_state(&body).map_err(|e| with_address(e, address))
    }

    /// Every entry under `prefix`, across all pages.
    pub async fn range(&self, deadline: &Deadline, prefix: &str) -> Result<Vec<StateEntry>, LedgerError> {
        let mut page = decode_state_list(&self.gateway.state_range(deadline, prefix).await?)?;
        let mut entries = std::mem::take(&mut page.entries);
        let mut followed = HashSet::new();

        while let Some(next) = page.next.take() {
            if !followed.insert(next.clone()) {
                return Err(LedgerError::Protocol(format!("paging loop at {next}")));
            }
            page = decode_state_list(&self.gateway.follow(deadline, &next).await?)?;
            entries.append(&mut page.entries);
        }

        debug!(prefix, entries = entries.len(), "Range read");
        Ok(entries)
    }

    /// Decoded records under `prefix`. Undecodable entries are skipped.
    pub async fn range_records<T: DeserializeOwned>(
        &self,
        deadline: &Deadline,
        prefix: &str,
    ) -> Result<Vec<(String, T)>, LedgerError> {
        let entries = self.range(deadline, prefix).await?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry.decode::<T>() {
                Ok(record) => Some((entry.address, record)),
                Err(e) => {
                    error!(address = %entry.address, error = %e, "Skipping undecodable state entry");
                    None
                }
            })
            .collect())
    }

    /// Payload of a committed transaction.
    pub async fn transaction_payload(&self, deadline: &Deadline, transaction_id: &str) -> Result<Vec<u8>, LedgerError> {
        let body = self.gateway.transaction(deadline, transaction_id).await?;
        decode_transaction_payload(&body)
    }

    // ------------------------------------------------------------------
    // proposals family
    // ------------------------------------------------------------------

    pub async fn proposal(&self, deadline: &Deadline, proposal_id: &str) -> Result<ProposalRecord, LedgerError> {
        self.state(deadline, self.proposals.proposal(proposal_id).as_str())
            .await
    }

    pub async fn proposal_user(&self, deadline: &Deadline, user_id: &str) -> Result<ProposalUserRecord, LedgerError> {
        self.state(deadline, self.proposals.user(user_id).as_str()).await
    }

    pub async fn document_index(&self, deadline: &Deadline, key: &DocumentKey) -> Result<DocumentIndexRecord, LedgerError> {
        self.state(deadline, self.proposals.document(key).as_str())
            .await
    }

    /// Every proposal whose current status is active.
    pub async fn active_proposals(&self, deadline: &Deadline) -> Result<Vec<ProposalRecord>, LedgerError> {
        let records: Vec<(String, ProposalRecord)> = self
            .range_records(deadline, self.proposals.proposal_range())
            .await?;
        let total = records.len();
        let active: Vec<ProposalRecord> = records
            .into_iter()
            .map(|(_, record)| record)
            .filter(ProposalRecord::is_active)
            .collect();

        debug!(total, active = active.len(), "Fetched proposals");
        Ok(active)
    }

    /// Active proposals authored by `user_id`.
    pub async fn user_proposals(&self, deadline: &Deadline, user_id: &str) -> Result<Vec<ProposalRecord>, LedgerError> {
        let index = self.proposal_user(deadline, user_id).await?;
        let reads = index.active.iter().map(|id| self.proposal(deadline, id));
        let results = join_all(reads).await;

        let mut proposals = Vec::with_capacity(results.len());
        for (id, result) in index.active.iter().zip(results) {
            match result {
                Ok(record) => proposals.push(record),
                Err(e) => error!(proposal_id = %id, error = %e, "Skipping unreadable proposal"),
            }
        }
        if proposals.len() != index.active.len() {
            warn!(
                user_id,
                returned = proposals.len(),
                listed = index.active.len(),
                "Returning a partial proposal list"
            );
        }
        Ok(proposals)
    }

    /// Open proposals of a document as `(proposal id, content hash)`.
    pub async fn document_proposals(&self, deadline: &Deadline, key: &DocumentKey) -> Result<Vec<(String, String)>, LedgerError> {
        let index = self.document_index(deadline, key).await?;
        Ok(index.proposals.into_iter().collect())
    }

    /// Vote threshold from the settings family.
    pub async fn vote_threshold(&self, deadline: &Deadline) -> Result<u32, LedgerError> {
        let address = setting_address(VOTE_THRESHOLD_SETTING);
        let bytes = self.state_bytes(deadline, address.as_str()).await?;
        let raw = decode_setting_value(&bytes, VOTE_THRESHOLD_SETTING)?;
        raw.trim()
            .parse()
            .map_err(|_| LedgerError::Decode(format!("{VOTE_THRESHOLD_SETTING} = {raw:?}")))
    }

    // ------------------------------------------------------------------
    // doctracker family
    // ------------------------------------------------------------------

    /// Every committed version of a document, ordered by version.
    pub async fn document_versions(&self, deadline: &Deadline, key: &DocumentKey) -> Result<Vec<DocumentVersionRecord>, LedgerError> {
        let prefix = self.documents.document_prefix(key);
        let mut versions: Vec<DocumentVersionRecord> = self
            .range_records(deadline, &prefix)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect();
        versions.sort_by_key(|version| version.version);
        Ok(versions)
    }

    pub async fn document_user(&self, deadline: &Deadline, user_id: &str) -> Result<DocumentUserRecord, LedgerError> {
        self.state(deadline, self.documents.user(user_id).as_str()).await
    }

    /// Versions the user authored.
    pub async fn documents_of_author(&self, deadline: &Deadline, user_id: &str) -> Result<Vec<DocumentVersionRecord>, LedgerError> {
        let user = self.document_user(deadline, user_id).await?;
        if user.authored.is_empty() {
            debug!(user_id, "User has no authored documents");
            return Ok(Vec::new());
        }
        self.versions_at(deadline, &user.authored).await
    }

    /// Versions the user signed.
    pub async fn documents_signed_by(&self, deadline: &Deadline, user_id: &str) -> Result<Vec<DocumentVersionRecord>, LedgerError> {
        let user = self.document_user(deadline, user_id).await?;
        if user.signed.is_empty() {
            debug!(user_id, "User has not signed any documents");
            return Ok(Vec::new());
        }
        self.versions_at(deadline, &user.signed).await
    }

    /// Load versions by address. Fails only when none of them could be read.
    async fn versions_at(&self, deadline: &Deadline, addresses: &[String]) -> Result<Vec<DocumentVersionRecord>, LedgerError> {
        let results = join_all(
            addresses
                .iter()
                .map(|address| self.state::<DocumentVersionRecord>(deadline, address)),
        )
        .await;

        let mut versions = Vec::with_capacity(results.len());
        let mut last_error = None;
        for (address, result) in addresses.iter().zip(results) {
            match result {
                Ok(version) => versions.push(version),
                Err(e) => {
                    error!(%address, error = %e, "Failed to load document version");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if versions.is_empty() => Err(e),
            _ => Ok(versions),
        }
    }
}

fn with_address(error: LedgerError, address: &str) -> LedgerError {
    match error {
        LedgerError::NotFound(_) => LedgerError::NotFound(address.to_string()),
        LedgerError::Decode(reason) => LedgerError::Decode(format!("{address}: {reason}")),
        other => other,
    }
}
