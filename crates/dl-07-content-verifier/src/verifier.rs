use dl_02_payload_codec::decode;
use dl_06_state_reader::StateReader;
use shared_crypto::sha512_hex;
use shared_types::{Deadline, DocumentVersionRecord, LedgerError, ProposalRecord};
use tracing::{debug, error};

/// Payload field holding the content digest of a proposal.
pub const CONTENT_HASH_FIELD: &str = "contentHash";

/// Result of comparing content with a recorded digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch,
}

impl Verification {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Digest recorded on the ledger for `content`.
pub fn content_digest(content: &[u8]) -> String {
    sha512_hex(content)
}

/// Compare `content` against the digest recorded on the ledger.
pub fn verify(on_chain_digest: &str, content: &[u8]) -> Verification {
    if content_digest(content) == on_chain_digest {
        Verification::Match
    } else {
        Verification::Mismatch
    }
}

fn ensure(on_chain_digest: &str, actual: String) -> Result<(), LedgerError> {
    if actual == on_chain_digest {
        Ok(())
    } else {
        Err(LedgerError::ContentMismatch {
            expected: on_chain_digest.to_string(),
            actual,
        })
    }
}

fn mismatch(on_chain_digest: &str, content: &[u8]) -> LedgerError {
    LedgerError::ContentMismatch {
        expected: on_chain_digest.to_string(),
        actual: content_digest(content),
    }
}

/// Content of a proposal against its recorded digest.
pub fn check_proposal(proposal: &ProposalRecord, content: &[u8]) -> Result<(), LedgerError> {
    if verify(&proposal.content_hash, content).is_match() {
        return Ok(());
    }
    error!(proposal_id = %proposal.proposal_id, "Proposal content does not match its digest");
    Err(mismatch(&proposal.content_hash, content))
}

/// Content of a document version against its recorded digest.
pub fn check_version(version: &DocumentVersionRecord, content: &[u8]) -> Result<(), LedgerError> {
    if verify(&version.content_hash, content).is_match() {
        return Ok(());
    }
    error!(
        document = %version.document_key(),
        version = version.version,
        "Document content does not match its digest"
    );
    Err(mismatch(&version.content_hash, content))
}

/// Checks proposal digests against the transactions that committed them.
#[derive(Debug, Clone)]
pub struct ContentVerifier {
    reader: StateReader,
}

impl ContentVerifier {
    pub fn new(reader: StateReader) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &StateReader {
        &self.reader
    }

    /// Compare `claimed_digest` with the digest written by the committed
    /// transaction `transaction_id`.
    pub async fn verify_committed_proposal(
        &self,
        deadline: &Deadline,
        transaction_id: &str,
        claimed_digest: &str,
    ) -> Result<(), LedgerError> {
        let payload = self.reader.transaction_payload(deadline, transaction_id).await?;
        let fields = decode(&payload)?;
        let recorded = fields.text(CONTENT_HASH_FIELD).ok_or_else(|| {
            LedgerError::Decode(format!("transaction {transaction_id} has no {CONTENT_HASH_FIELD}"))
        })?;

        debug!(transaction_id, "Comparing committed content digest");
        ensure(recorded, claimed_digest.to_string()).inspect_err(|_| {
            error!(transaction_id, "Committed digest differs from the claimed one");
        })
    }
}
