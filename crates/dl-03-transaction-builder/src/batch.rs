//! Signed batches.

use crate::proto::{Batch, BatchHeader, BatchList};
use crate::transaction::SignedTransaction;
use prost::Message;
use shared_crypto::Secp256k1KeyPair;
use shared_types::LedgerError;
use tracing::debug;

/// A batch ready for `POST /batches`. Built right before submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedBatch {
    batch: Batch,
    transaction_ids: Vec<String>,
}

impl SignedBatch {
    /// Batch header signature, used as the submission id.
    pub fn batch_id(&self) -> &str {
        &self.batch.header_signature
    }

    pub fn transaction_ids(&self) -> &[String] {
        &self.transaction_ids
    }

    pub fn as_proto(&self) -> &Batch {
        &self.batch
    }

    /// Serialized `BatchList` holding this batch alone.
    pub fn to_bytes(&self) -> Vec<u8> {
        BatchList {
            batches: vec![self.batch.clone()],
        }
        .encode_to_vec()
    }
}

/// Wraps transactions into a batch signed by the batcher key.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchBuilder;

impl BatchBuilder {
    pub fn build(
        transactions: Vec<SignedTransaction>,
        signer: &Secp256k1KeyPair,
    ) -> Result<SignedBatch, LedgerError> {
        if transactions.is_empty() {
            return Err(LedgerError::InvalidInput("batch without transactions".into()));
        }

        let public_key = signer.public_key_hex();
        if let Some(foreign) = transactions
            .iter()
            .find(|tx| tx.header().batcher_public_key != public_key)
        {
            return Err(LedgerError::InvalidInput(format!(
                "transaction {} names a different batcher key",
                foreign.id()
            )));
        }

        let transaction_ids: Vec<String> = transactions.iter().map(|tx| tx.id().to_string()).collect();
        let header = BatchHeader {
            signer_public_key: public_key,
            transaction_ids: transaction_ids.clone(),
        }
        .encode_to_vec();
        let header_signature = signer.sign_hex(&header);

        debug!(
            batch_id = %header_signature,
            transactions = transaction_ids.len(),
            "Built batch"
        );

        Ok(SignedBatch {
            batch: Batch {
                header,
                header_signature,
                transactions: transactions.into_iter().map(SignedTransaction::into_proto).collect(),
                trace: false,
            },
            transaction_ids,
        })
    }
}
