//! Signed transactions.

use crate::proto::{Transaction, TransactionHeader};
use dl_02_payload_codec::{encode, payload_sha512, PayloadFields};
use prost::Message;
use rand::Rng;
use shared_crypto::Secp256k1KeyPair;
use shared_types::LedgerError;
use std::fmt;
use tracing::debug;

/// Payload key holding the action discriminator.
pub const ACTION_FIELD: &str = "action";

/// Kind of work a transaction asks its family processor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Insert,
    Vote,
    Delete,
    Invalidate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Vote => "vote",
            Self::Delete => "delete",
            Self::Invalidate => "invalidate",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and version of a transaction family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyDescriptor {
    pub name: &'static str,
    pub version: &'static str,
}

impl FamilyDescriptor {
    pub const PROPOSALS: Self = Self {
        name: dl_01_address_codec::proposals::FAMILY_NAME,
        version: dl_01_address_codec::proposals::FAMILY_VERSION,
    };

    pub const DOCTRACKER: Self = Self {
        name: dl_01_address_codec::doctracker::FAMILY_NAME,
        version: dl_01_address_codec::doctracker::FAMILY_VERSION,
    };
}

/// A transaction ready to be batched. Never mutated after signing.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    header: TransactionHeader,
    transaction: Transaction,
}

impl SignedTransaction {
    /// Header signature, which is also the transaction id.
    pub fn id(&self) -> &str {
        &self.transaction.header_signature
    }

    pub fn header(&self) -> &TransactionHeader {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.transaction.payload
    }

    /// Addresses declared as both inputs and outputs.
    pub fn addresses(&self) -> &[String] {
        &self.header.inputs
    }

    pub fn as_proto(&self) -> &Transaction {
        &self.transaction
    }

    pub fn into_proto(self) -> Transaction {
        self.transaction
    }
}

/// Builds transactions of one family.
#[derive(Debug, Clone, Copy)]
pub struct TransactionBuilder {
    family: FamilyDescriptor,
}

impl TransactionBuilder {
    pub fn new(family: FamilyDescriptor) -> Self {
        Self { family }
    }

    pub fn family(&self) -> FamilyDescriptor {
        self.family
    }

    /// Encode `fields` plus the action, declare `addresses` as inputs and
    /// outputs, and sign the header with `signer`.
    pub fn build<A>(
        &self,
        action: Action,
        mut fields: PayloadFields,
        addresses: A,
        signer: &Secp256k1KeyPair,
    ) -> Result<SignedTransaction, LedgerError>
    where
        A: IntoIterator,
        A::Item: Into<String>,
    {
        fields.insert(ACTION_FIELD, action.as_str());
        let payload = encode(&fields)?;
        let addresses: Vec<String> = addresses.into_iter().map(Into::into).collect();
        let public_key = signer.public_key_hex();

        let header = TransactionHeader {
            batcher_public_key: public_key.clone(),
            dependencies: Vec::new(),
            family_name: self.family.name.to_string(),
            family_version: self.family.version.to_string(),
            inputs: addresses.clone(),
            nonce: rand::thread_rng().gen::<u64>().to_string(),
            outputs: addresses,
            payload_sha512: payload_sha512(&payload),
            signer_public_key: public_key,
        };
        let header_bytes = header.encode_to_vec();
        let header_signature = signer.sign_hex(&header_bytes);

        debug!(
            family = self.family.name,
            action = %action,
            transaction_id = %header_signature,
            addresses = header.inputs.len(),
            "Built transaction"
        );

        Ok(SignedTransaction {
            transaction: Transaction {
                header: header_bytes,
                header_signature,
                payload,
            },
            header,
        })
    }
}
