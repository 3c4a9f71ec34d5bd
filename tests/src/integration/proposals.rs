//! # Proposal Workflow
//!
//! `DocumentWorkflow` over the REST ledger client, an in-memory content store
//! and in-memory keys.

#[cfg(test)]
mod tests {
    use crate::support::MockLedger;
    use dl_01_address_codec::ProposalAddresses;
    use dl_05_batch_submitter::BatchStatus;
    use dl_07_content_verifier::content_digest;
    use doc_runtime::{
        ContentKey, ContentStore, DocumentWorkflow, InMemoryContentStore, InMemoryKeyProvider, LedgerClient,
        LedgerPort, ProposalDraft, RuntimeConfig,
    };
    use shared_types::{DocumentIndexRecord, DocumentKey, ErrorKind, LedgerError};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;

    const CONTENT: &[u8] = b"hulajnogi sa ze stonogi";

    struct Setup {
        ledger: MockLedger,
        store: Arc<InMemoryContentStore>,
        workflow: DocumentWorkflow,
    }

    async fn setup(status: &'static str) -> Setup {
        let ledger = MockLedger::start().await;
        ledger.report_status(status).await;

        let store = Arc::new(InMemoryContentStore::new());
        let keys = InMemoryKeyProvider::generate();
        keys.register_generated("alice");
        let workflow = DocumentWorkflow::new(
            Arc::new(ledger.client()),
            store.clone(),
            Arc::new(keys),
            Duration::from_secs(5),
        );
        Setup { ledger, store, workflow }
    }

    fn draft() -> ProposalDraft {
        ProposalDraft::new(DocumentKey::general("dash"), "alice", CONTENT)
    }

    #[tokio::test]
    async fn test_submitted_content_verifies_against_committed_transaction() {
        let s = setup("COMMITTED").await;
        s.ledger.no_other_state().await;

        let receipt = s.workflow.add_proposal(&s.workflow.deadline(), draft()).await.unwrap();
        assert_eq!(receipt.status, BatchStatus::Committed);
        assert_eq!(
            s.store.get(&ContentKey::proposal(&receipt.proposal_id)).await.unwrap(),
            CONTENT
        );

        let transaction_id = s.ledger.posted()[0].header_signature.clone();
        let client = s.ledger.client();
        let deadline = s.workflow.deadline();
        client
            .verify_committed_proposal(&deadline, &transaction_id, &content_digest(CONTENT))
            .await
            .unwrap();

        let garbage = format!("{}garbage", content_digest(CONTENT));
        let err = client
            .verify_committed_proposal(&deadline, &transaction_id, &garbage)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ContentMismatch { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_content_is_not_submitted() {
        let s = setup("COMMITTED").await;
        let index = DocumentIndexRecord {
            proposals: BTreeMap::from([("p0".to_string(), content_digest(CONTENT))]),
        };
        let address = ProposalAddresses::global().document(&DocumentKey::general("dash"));
        s.ledger.serve_state(address.as_str(), &index).await;

        let err = s.workflow.add_proposal(&s.workflow.deadline(), draft()).await.unwrap_err();

        assert!(matches!(err.ledger(), Some(LedgerError::ProposalExists { proposal_id }) if proposal_id == "p0"));
        assert!(s.ledger.posted().is_empty());
        assert!(s.store.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_proposal_leaves_no_content() {
        let s = setup("INVALID").await;
        s.ledger.no_other_state().await;

        let err = s.workflow.add_proposal(&s.workflow.deadline(), draft()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(s.ledger.posted().len(), 1);
        assert!(s.store.is_empty());
    }

    #[tokio::test]
    async fn test_unconfirmed_proposal_leaves_no_content() {
        let s = setup("PENDING").await;
        s.ledger.no_other_state().await;

        let err = s.workflow.add_proposal(&s.workflow.deadline(), draft()).await.unwrap_err();

        assert!(matches!(err.ledger(), Some(LedgerError::Unconfirmed { .. })));
        assert!(s.store.is_empty());
    }

    #[tokio::test]
    async fn test_pending_proposal_with_committed_transaction_is_kept() {
        let s = setup("PENDING").await;
        s.ledger.commit_transactions();
        s.ledger.no_other_state().await;

        let receipt = s.workflow.add_proposal(&s.workflow.deadline(), draft()).await.unwrap();

        assert_eq!(receipt.status, BatchStatus::Pending);
        assert_eq!(receipt.content_hash, content_digest(CONTENT));
        assert!(s.store.contains(&ContentKey::proposal(&receipt.proposal_id)));
    }

    #[tokio::test]
    async fn test_unreachable_ledger_leaves_no_content() {
        let store = Arc::new(InMemoryContentStore::new());
        let keys = InMemoryKeyProvider::generate();
        keys.register_generated("alice");
        let config = RuntimeConfig {
            rest_api_url: "http://127.0.0.1:1".into(),
            ..RuntimeConfig::default()
        };
        let ledger = LedgerClient::from_config(&config).unwrap();
        let workflow = DocumentWorkflow::new(Arc::new(ledger), store.clone(), Arc::new(keys), Duration::from_secs(5));

        let err = workflow.add_proposal(&workflow.deadline(), draft()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(store.is_empty());
    }
}
