//! # Document Versions
//!
//! Accepted proposals becoming versions, and verification of stored versions.

#[cfg(test)]
mod tests {
    use crate::support::MockLedger;
    use dl_01_address_codec::{DocTrackerAddresses, ProposalAddresses};
    use dl_03_transaction_builder::FamilyDescriptor;
    use dl_07_content_verifier::content_digest;
    use doc_runtime::{ContentKey, ContentStore, DocumentWorkflow, InMemoryContentStore, InMemoryKeyProvider};
    use shared_types::{DocumentKey, DocumentStatus, DocumentVersionRecord, ProposalRecord, ProposalStatus};
    use std::sync::Arc;
    use std::time::Duration;

    const CONTENT: &[u8] = b"hulajnogi sa ze stonogi";

    fn dash() -> DocumentKey {
        DocumentKey::general("dash")
    }

    fn version(number: u32, content: &[u8]) -> DocumentVersionRecord {
        DocumentVersionRecord {
            proposal_id: format!("p{number}"),
            category: "general".into(),
            document_name: "dash".into(),
            content_hash: content_digest(content),
            status: DocumentStatus::Active,
            author: "alice".into(),
            version: number,
            signers: vec!["bob".into()],
        }
    }

    fn versions(records: Vec<DocumentVersionRecord>) -> Vec<(String, DocumentVersionRecord)> {
        records
            .into_iter()
            .map(|record| {
                let address = DocTrackerAddresses::global()
                    .document_version(&record.document_key(), record.version)
                    .unwrap();
                (address.into_string(), record)
            })
            .collect()
    }

    fn workflow(ledger: &MockLedger, store: Arc<InMemoryContentStore>) -> DocumentWorkflow {
        DocumentWorkflow::new(
            Arc::new(ledger.client()),
            store,
            Arc::new(InMemoryKeyProvider::generate()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_accepted_proposal_after_versions_one_and_three_is_four() {
        let ledger = MockLedger::start().await;
        ledger.report_status("COMMITTED").await;
        let proposal = ProposalRecord {
            proposal_id: "p9".into(),
            doc_name: "dash".into(),
            category: "general".into(),
            author: "alice".into(),
            signers: vec!["bob".into(), "carol".into()],
            proposed_doc_status: DocumentStatus::Active,
            current_status: ProposalStatus::Accepted,
            content_hash: content_digest(CONTENT),
        };
        ledger
            .serve_state(ProposalAddresses::global().proposal("p9").as_str(), &proposal)
            .await;
        ledger
            .serve_range(
                &DocTrackerAddresses::global().document_prefix(&dash()),
                &versions(vec![version(3, b"v3"), version(1, b"v1")]),
            )
            .await;
        ledger.no_other_state().await;

        let store = Arc::new(InMemoryContentStore::new());
        store.tamper(&ContentKey::proposal("p9"), CONTENT.to_vec());

        let record = workflow(&ledger, store.clone())
            .handle_proposal_accepted(b"p9")
            .await
            .unwrap();

        assert_eq!(record.version, 4);
        let payloads = ledger.posted_payloads();
        assert_eq!(payloads.len(), 1);
        let (family, fields) = &payloads[0];
        assert_eq!(family, FamilyDescriptor::DOCTRACKER.name);
        assert_eq!(fields.get("version").and_then(|v| v.as_unsigned()), Some(4));
        assert_eq!(fields.text("proposalID"), Some("p9"));
        assert_eq!(store.get(&ContentKey::document(dash(), 4)).await.unwrap(), CONTENT);
    }

    #[tokio::test]
    async fn test_tampered_version_is_invalidated_not_returned() {
        let ledger = MockLedger::start().await;
        ledger.report_status("COMMITTED").await;
        ledger
            .serve_range(
                &DocTrackerAddresses::global().document_prefix(&dash()),
                &versions(vec![version(1, b"v1"), version(2, b"v2")]),
            )
            .await;

        let store = Arc::new(InMemoryContentStore::new());
        store.tamper(&ContentKey::document(dash(), 1), b"v1".to_vec());
        store.tamper(&ContentKey::document(dash(), 2), b"forged".to_vec());

        let workflow = workflow(&ledger, store.clone());
        let verified = workflow.document_versions(&workflow.deadline(), &dash()).await.unwrap();

        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].record.version, 1);
        assert_eq!(verified[0].content, b"v1");

        let payloads = ledger.posted_payloads();
        assert_eq!(payloads.len(), 1);
        let expected_address = DocTrackerAddresses::global().document_version(&dash(), 2).unwrap();
        assert_eq!(payloads[0].1.text("action"), Some("invalidate"));
        assert_eq!(payloads[0].1.text("address"), Some(expected_address.as_str()));
        assert_eq!(store.get(&ContentKey::document(dash(), 2)).await.unwrap(), b"forged");
    }
}
