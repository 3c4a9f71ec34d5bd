//! # Ledger Events
//!
//! Listener delivery and shutdown over the in-memory validator connection.

#[cfg(test)]
mod tests {
    use crate::support::MockLedger;
    use dl_01_address_codec::ProposalAddresses;
    use dl_07_content_verifier::content_digest;
    use dl_08_event_listener::{handler_fn, memory_pair, EventListener, ListenerConfig, ListenerState};
    use doc_runtime::{
        ContentKey, DocRuntime, InMemoryContentStore, InMemoryKeyProvider, PROPOSAL_ACCEPTED,
    };
    use parking_lot::Mutex;
    use shared_types::{DocumentKey, DocumentStatus, ProposalRecord, ProposalStatus};
    use std::sync::Arc;
    use std::time::Duration;

    async fn eventually(what: &str, check: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !check() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("{what} in time"));
    }

    #[tokio::test]
    async fn test_registered_event_delivered_once_unregistered_skipped() {
        let received: Arc<Mutex<Vec<Vec<u8>>>> = Arc::default();
        let sink = received.clone();

        let mut listener = EventListener::new(ListenerConfig::default());
        listener
            .set_handler(
                PROPOSAL_ACCEPTED,
                handler_fn(move |data| {
                    let sink = sink.clone();
                    async move {
                        sink.lock().push(data);
                        Ok(())
                    }
                }),
            )
            .unwrap();

        let (connection, validator) = memory_pair();
        let publisher = validator.publisher();
        let requests = validator.acknowledge(&[]);
        listener.start_with(connection).await.unwrap();
        assert_eq!(listener.subscribed_event_types(), [PROPOSAL_ACCEPTED.to_string()]);

        publisher
            .publish(&[("block_commit", b"block"), (PROPOSAL_ACCEPTED, b"abc123")])
            .unwrap();
        eventually("event delivered", || !received.lock().is_empty()).await;

        listener.stop().await.unwrap();
        assert_eq!(listener.state(), ListenerState::Stopped);
        assert_eq!(*received.lock(), vec![b"abc123".to_vec()]);
        assert_eq!(requests.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_returns_after_accepted_proposal_settles() {
        let ledger = MockLedger::start().await;
        ledger
            .report_status_after("INVALID", Duration::from_millis(300))
            .await;

        let content = b"hulajnogi sa ze stonogi";
        let proposal = ProposalRecord {
            proposal_id: "p9".into(),
            doc_name: "dash".into(),
            category: "general".into(),
            author: "alice".into(),
            signers: vec!["bob".into()],
            proposed_doc_status: DocumentStatus::Active,
            current_status: ProposalStatus::Accepted,
            content_hash: content_digest(content),
        };
        ledger
            .serve_state(ProposalAddresses::global().proposal("p9").as_str(), &proposal)
            .await;
        ledger.no_other_state().await;

        let store = Arc::new(InMemoryContentStore::new());
        store.tamper(&ContentKey::proposal("p9"), content.to_vec());
        let version_key = ContentKey::document(DocumentKey::general("dash"), 1);

        let mut runtime = DocRuntime::with_ledger(
            ledger.config(),
            Arc::new(ledger.client()),
            store.clone(),
            Arc::new(InMemoryKeyProvider::generate()),
        )
        .unwrap();

        let (connection, validator) = memory_pair();
        let publisher = validator.publisher();
        let _requests = validator.acknowledge(&[]);
        runtime.start_with(connection).await.unwrap();

        publisher.publish(&[(PROPOSAL_ACCEPTED, b"p9")]).unwrap();
        ledger.wait_for_posts(1).await;
        assert!(store.contains(&version_key));

        runtime.shutdown().await.unwrap();

        // The rejected batch rolled the version content back before shutdown returned.
        assert!(!store.contains(&version_key));
        assert!(store.contains(&ContentKey::proposal("p9")));
        assert_eq!(runtime.listener_state(), ListenerState::Stopped);
    }
}
