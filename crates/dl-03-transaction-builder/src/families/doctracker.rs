//! `doctracker` family transactions.

use super::dedup;
use crate::transaction::{Action, FamilyDescriptor, SignedTransaction, TransactionBuilder};
use dl_01_address_codec::DocTrackerAddresses;
use dl_02_payload_codec::PayloadFields;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{DocumentStatus, DocumentVersionRecord, LedgerError};

/// Builds document version transactions against one set of family addresses.
#[derive(Debug, Clone, Copy)]
pub struct DocumentTransactions<'a> {
    addresses: &'a DocTrackerAddresses,
    builder: TransactionBuilder,
}

impl DocumentTransactions<'static> {
    pub fn global() -> Self {
        Self::new(DocTrackerAddresses::global())
    }
}

impl<'a> DocumentTransactions<'a> {
    pub fn new(addresses: &'a DocTrackerAddresses) -> Self {
        Self {
            addresses,
            builder: TransactionBuilder::new(FamilyDescriptor::DOCTRACKER),
        }
    }

    pub fn version_address(&self, version: &DocumentVersionRecord) -> Result<String, LedgerError> {
        self.addresses
            .document_version(&version.document_key(), version.version)
            .map(|address| address.into_string())
    }

    /// Commit a new version. Touches every signer, the author and the version.
    pub fn insert(
        &self,
        version: &DocumentVersionRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SignedTransaction, LedgerError> {
        let version_address = self.version_address(version)?;
        let fields = PayloadFields::new()
            .with("proposalID", &version.proposal_id)
            .with("category", &version.category)
            .with("documentName", &version.document_name)
            .with("contentHash", &version.content_hash)
            .with("status", version.status.as_str())
            .with("author", &version.author)
            .with("version", version.version)
            .with("signers", version.signers.clone());

        let mut addresses: Vec<String> = version
            .signers
            .iter()
            .map(|user| self.addresses.user(user).into_string())
            .collect();
        addresses.push(self.addresses.user(&version.author).into_string());
        addresses.push(version_address);

        self.builder
            .build(Action::Insert, fields, dedup(addresses), signer)
    }

    /// Mark a version invalid. Only the version itself is touched.
    pub fn invalidate(
        &self,
        version: &DocumentVersionRecord,
        signer: &Secp256k1KeyPair,
    ) -> Result<SignedTransaction, LedgerError> {
        if !version.status.can_transition_to(DocumentStatus::Invalid) {
            return Err(LedgerError::InvalidTransition {
                from: version.status.to_string(),
                to: DocumentStatus::Invalid.to_string(),
            });
        }

        let version_address = self.version_address(version)?;
        let fields = PayloadFields::new().with("address", &version_address);
        self.builder
            .build(Action::Invalidate, fields, [version_address], signer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dl_02_payload_codec::{decode, FieldValue};

    fn version(number: u32, status: DocumentStatus) -> DocumentVersionRecord {
        DocumentVersionRecord {
            proposal_id: "p-1".into(),
            category: "general".into(),
            document_name: "dash".into(),
            content_hash: "ab".into(),
            status,
            author: "faef".into(),
            version: number,
            signers: vec!["s1".into(), "faef".into()],
        }
    }

    #[test]
    fn test_insert_declares_signers_author_and_version() {
        let family = DocTrackerAddresses::global();
        let record = version(4, DocumentStatus::Active);
        let tx = DocumentTransactions::global()
            .insert(&record, &Secp256k1KeyPair::generate())
            .unwrap();

        assert_eq!(
            tx.addresses(),
            [
                family.user("s1").into_string(),
                family.user("faef").into_string(),
                family
                    .document_version(&record.document_key(), 4)
                    .unwrap()
                    .into_string(),
            ]
        );
        let fields = decode(tx.payload()).unwrap();
        assert_eq!(fields.get("version"), Some(&FieldValue::Unsigned(4)));
        assert_eq!(fields.text("documentName"), Some("dash"));
    }

    #[test]
    fn test_invalidate_targets_version_only() {
        let record = version(2, DocumentStatus::Active);
        let transactions = DocumentTransactions::global();
        let tx = transactions
            .invalidate(&record, &Secp256k1KeyPair::generate())
            .unwrap();
        let address = transactions.version_address(&record).unwrap();

        assert_eq!(tx.addresses(), [address.clone()]);
        let fields = decode(tx.payload()).unwrap();
        assert_eq!(fields.text("action"), Some("invalidate"));
        assert_eq!(fields.text("address"), Some(address.as_str()));
    }

    #[test]
    fn test_invalid_version_cannot_be_invalidated_again() {
        let result = DocumentTransactions::global().invalidate(
            &version(2, DocumentStatus::Invalid),
            &Secp256k1KeyPair::generate(),
        );
        assert!(matches!(result, Err(LedgerError::InvalidTransition { .. })));
    }
}
