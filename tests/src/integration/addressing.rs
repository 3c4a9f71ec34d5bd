//! # Addressing Across Crates
//!
//! Transactions must declare exactly the addresses the reader later reads.

#[cfg(test)]
mod tests {
    use dl_01_address_codec::{setting_address, DocTrackerAddresses, ProposalAddresses, ADDRESS_LEN};
    use dl_03_transaction_builder::{DocumentTransactions, ProposalTransactions};
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::{DocumentKey, DocumentStatus, DocumentVersionRecord, NewProposal, ProposalRecord, ProposalStatus};

    const PROPOSAL_ID: &str = "60a9e27b2ca2d845d7304a0955a1b358ec6e66d952bfc199b862d05ad365588d\
                               4f2272a0d570117518bb781667b6012b0f89206e89baabfe1bc8792c009bfcff";
    const PROPOSAL_ADDRESS: &str = "8ed94c5290e964cc4cc0674fbd42665971d649f83ded200beda9732a984eb6e5d69f6b";

    fn new_proposal() -> NewProposal {
        NewProposal {
            proposal_id: PROPOSAL_ID.into(),
            document: DocumentKey::general("dash"),
            author: "alabaster".into(),
            content_hash: "ab".into(),
            proposed_status: DocumentStatus::Active,
        }
    }

    #[test]
    fn test_insert_declares_fixture_address() {
        let signer = Secp256k1KeyPair::generate();
        let tx = ProposalTransactions::global().insert(&new_proposal(), &signer).unwrap();

        assert_eq!(tx.addresses()[0], PROPOSAL_ADDRESS);
        assert!(tx.addresses().iter().all(|a| a.len() == ADDRESS_LEN));
        assert!(tx
            .addresses()
            .contains(&ProposalAddresses::global().user("alabaster").into_string()));
        assert!(tx
            .addresses()
            .contains(&ProposalAddresses::global().document(&DocumentKey::general("dash")).into_string()));
    }

    #[test]
    fn test_vote_reads_threshold_setting() {
        let proposal = ProposalRecord {
            proposal_id: PROPOSAL_ID.into(),
            doc_name: "dash".into(),
            category: "general".into(),
            author: "alabaster".into(),
            signers: Vec::new(),
            proposed_doc_status: DocumentStatus::Active,
            current_status: ProposalStatus::Active,
            content_hash: "ab".into(),
        };
        let tx = ProposalTransactions::global()
            .vote(&proposal, "bob", &Secp256k1KeyPair::generate())
            .unwrap();

        assert!(tx.header().inputs.contains(&PROPOSAL_ADDRESS.to_string()));
        assert!(tx
            .header()
            .inputs
            .contains(&setting_address("proposal.vote.threshold").into_string()));
    }

    #[test]
    fn test_version_address_is_under_document_prefix() {
        let addresses = DocTrackerAddresses::global();
        let key = DocumentKey::general("dash");
        let record = DocumentVersionRecord {
            proposal_id: PROPOSAL_ID.into(),
            category: key.category.clone(),
            document_name: key.name.clone(),
            content_hash: "ab".into(),
            status: DocumentStatus::Active,
            author: "alabaster".into(),
            version: 4,
            signers: vec!["bob".into()],
        };

        let written = DocumentTransactions::global().version_address(&record).unwrap();
        let read = addresses.document_version(&key, 4).unwrap();

        assert_eq!(written, read.as_str());
        assert!(written.starts_with(&addresses.document_prefix(&key)));
        assert_ne!(written, addresses.document_version(&key, 3).unwrap().as_str());
    }
}
