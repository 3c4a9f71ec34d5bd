//! # Batch Submission
//!
//! What reaches `POST /batches`, and how long a submission may take.

#[cfg(test)]
mod tests {
    use crate::support::MockLedger;
    use dl_02_payload_codec::payload_sha512;
    use dl_03_transaction_builder::proto::TransactionHeader;
    use dl_05_batch_submitter::BatchStatus;
    use doc_runtime::{LedgerPort, RuntimeConfig};
    use prost::Message;
    use shared_crypto::{Secp256k1KeyPair, Secp256k1Signature};
    use shared_types::{Deadline, DocumentKey, DocumentStatus, LedgerError, NewProposal};
    use std::time::{Duration, Instant};

    fn new_proposal() -> NewProposal {
        NewProposal {
            proposal_id: "p1".into(),
            document: DocumentKey::general("dash"),
            author: "alice".into(),
            content_hash: "ab".into(),
            proposed_status: DocumentStatus::Active,
        }
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_posted_transaction_is_signed_by_submitter() {
        let ledger = MockLedger::start().await;
        ledger.report_status("COMMITTED").await;
        let signer = Secp256k1KeyPair::generate();

        let outcome = ledger
            .client()
            .submit_proposal(&deadline(), &new_proposal(), &signer)
            .await
            .unwrap();
        assert!(outcome.is_committed());

        let posted = ledger.posted();
        assert_eq!(posted.len(), 1);
        let tx = &posted[0];
        assert_eq!(outcome.transaction_ids, vec![tx.header_signature.clone()]);

        let header = TransactionHeader::decode(tx.header.as_slice()).unwrap();
        assert_eq!(header.family_name, "proposals");
        assert_eq!(header.signer_public_key, signer.public_key_hex());
        assert_eq!(header.payload_sha512, payload_sha512(&tx.payload));

        let signature = Secp256k1Signature::from_hex(&tx.header_signature).unwrap();
        signer.public_key().verify(&tx.header, &signature).unwrap();

        let (_, fields) = &ledger.posted_payloads()[0];
        assert_eq!(fields.text("action"), Some("insert"));
        assert_eq!(fields.text("proposalID"), Some("p1"));
    }

    #[tokio::test]
    async fn test_always_pending_returns_within_max_wait() {
        let ledger = MockLedger::start().await;
        ledger.report_status("PENDING").await;
        let config = RuntimeConfig {
            submit_max_wait: Duration::from_millis(500),
            status_poll_interval: Duration::from_millis(50),
            ..ledger.config()
        };
        let client = doc_runtime::LedgerClient::from_config(&config).unwrap();

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            Duration::from_secs(3),
            client.submit_proposal(&deadline(), &new_proposal(), &Secp256k1KeyPair::generate()),
        )
        .await
        .expect("submission bounded by max wait")
        .unwrap();

        assert_eq!(outcome.status, BatchStatus::Pending);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(outcome.into_committed(), Err(LedgerError::Unconfirmed { .. })));
    }

    #[tokio::test]
    async fn test_invalid_batch_carries_processor_message() {
        let ledger = MockLedger::start().await;
        ledger.report_status("INVALID").await;

        let outcome = ledger
            .client()
            .submit_proposal(&deadline(), &new_proposal(), &Secp256k1KeyPair::generate())
            .await
            .unwrap();

        match outcome.into_committed() {
            Err(LedgerError::Rejected { reason, .. }) => assert!(reason.contains("rejected by")),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_caller_deadline_shortens_the_wait() {
        let ledger = MockLedger::start().await;
        ledger.report_status_after("COMMITTED", Duration::from_secs(2)).await;

        let outcome = ledger
            .client()
            .submit_proposal(
                &Deadline::after(Duration::from_millis(300)),
                &new_proposal(),
                &Secp256k1KeyPair::generate(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, BatchStatus::Pending);
        assert!(outcome.elapsed < Duration::from_secs(1));
    }
}
