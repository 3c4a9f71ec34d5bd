//! Submit-and-poll.

use crate::config::SubmitterConfig;
use crate::status::{BatchStatus, InvalidTransaction, StatusReport};
use dl_03_transaction_builder::{BatchBuilder, SignedBatch, SignedTransaction};
use dl_04_rest_gateway::RestGateway;
use serde::Deserialize;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Deadline, LedgerError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What is known about a batch once `submit` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub batch_id: String,
    pub transaction_ids: Vec<String>,
    pub status: BatchStatus,
    pub invalid_transactions: Vec<InvalidTransaction>,
    /// Status link from the POST acknowledgement.
    pub link: Option<String>,
    /// Time from the POST to the last status.
    pub elapsed: Duration,
}

impl SubmitOutcome {
    pub fn is_committed(&self) -> bool {
        self.status == BatchStatus::Committed
    }

    /// Ok only for a committed batch.
    pub fn into_committed(self) -> Result<Self, LedgerError> {
        match self.status {
            BatchStatus::Committed => Ok(self),
            BatchStatus::Invalid => Err(LedgerError::Rejected {
                reason: self
                    .invalid_transactions
                    .iter()
                    .map(|tx| tx.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
                batch_id: self.batch_id,
            }),
            BatchStatus::Pending | BatchStatus::Unknown => Err(LedgerError::Unconfirmed {
                status: self.status.to_string(),
                batch_id: self.batch_id,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Acknowledgement {
    #[serde(default)]
    link: Option<String>,
}

/// Submits batches through the REST gateway.
#[derive(Debug, Clone)]
pub struct BatchSubmitter {
    gateway: RestGateway,
    config: SubmitterConfig,
}

impl BatchSubmitter {
    pub fn new(gateway: RestGateway, config: SubmitterConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self { gateway, config })
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Batch `transactions` under `signer` and submit right away.
    pub async fn submit_transactions(
        &self,
        deadline: &Deadline,
        transactions: Vec<SignedTransaction>,
        signer: &Secp256k1KeyPair,
    ) -> Result<SubmitOutcome, LedgerError> {
        let batch = BatchBuilder::build(transactions, signer)?;
        self.submit(deadline, &batch).await
    }

    /// POST the batch, then poll until terminal or the wait window closes.
    ///
    /// A window that closes while the batch is still pending is not an error;
    /// the outcome then carries `BatchStatus::Pending`.
    pub async fn submit(&self, deadline: &Deadline, batch: &SignedBatch) -> Result<SubmitOutcome, LedgerError> {
        let batch_id = batch.batch_id().to_string();
        let started = Instant::now();
        let window = (*deadline).min(Deadline::at(started + self.config.max_wait));

        debug!(batch_id = %batch_id, transactions = batch.transaction_ids().len(), "Submitting batch");
        let ack = self.gateway.post_batches(deadline, batch.to_bytes()).await?;
        let link = serde_json::from_slice::<Acknowledgement>(&ack)
            .ok()
            .and_then(|ack| ack.link);

        let mut status = BatchStatus::Pending;
        let mut invalid_transactions = Vec::new();

        while !window.is_expired() {
            let polled_at = Instant::now();
            let wait_secs = window.remaining().as_secs_f64().ceil() as u64;

            match self.poll(&window, &batch_id, wait_secs).await {
                Ok(report) => {
                    status = report.status;
                    invalid_transactions = report.invalid_transactions;
                }
                Err(LedgerError::DeadlineExceeded) => break,
                Err(e) => return Err(e),
            }
            if status.is_terminal() {
                break;
            }

            let next_poll = (polled_at + self.config.poll_interval).min(window.instant());
            tokio::time::sleep_until(next_poll).await;
        }

        let elapsed = started.elapsed();
        match status {
            BatchStatus::Committed => info!(batch_id = %batch_id, ?elapsed, "Batch committed"),
            BatchStatus::Invalid => warn!(
                batch_id = %batch_id,
                reasons = ?invalid_transactions,
                "Batch rejected"
            ),
            BatchStatus::Pending | BatchStatus::Unknown => warn!(
                batch_id = %batch_id,
                status = %status,
                ?elapsed,
                "Batch not confirmed within the wait window"
            ),
        }

        Ok(SubmitOutcome {
            batch_id,
            transaction_ids: batch.transaction_ids().to_vec(),
            status,
            invalid_transactions,
            link,
            elapsed,
        })
    }

    /// One status request.
    pub async fn poll(&self, deadline: &Deadline, batch_id: &str, wait_secs: u64) -> Result<StatusReport, LedgerError> {
        let body = self.gateway.batch_status(deadline, batch_id, wait_secs).await?;
        let report = StatusReport::from_body(&body, batch_id)?;
        debug!(batch_id = %batch_id, status = %report.status, "Batch status");
        Ok(report)
    }
}
