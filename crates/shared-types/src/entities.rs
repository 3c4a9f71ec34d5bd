//! # Ledger State Records
//!
//! Typed forms of the CBOR records the transaction processors keep in ledger
//! state. Field names on the wire are fixed by the processors, hence the
//! explicit `serde(rename)` attributes.
//!
//! ## Families
//!
//! - **proposals**: [`ProposalRecord`], [`ProposalUserRecord`], [`DocumentIndexRecord`]
//! - **doctracker**: [`DocumentVersionRecord`], [`DocumentUserRecord`]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category used when a request does not name one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Business key of a document: category plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    pub category: String,
    pub name: String,
}

impl DocumentKey {
    /// Build a key. An empty category falls back to [`DEFAULT_CATEGORY`].
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category
            },
            name: name.into(),
        }
    }

    /// Key in the default category.
    pub fn general(name: impl Into<String>) -> Self {
        Self::new(DEFAULT_CATEGORY, name)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Lifecycle of a proposal in the proposals family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Collecting votes.
    Active,
    /// Reached the vote threshold.
    Accepted,
    /// Deleted by its author or by the application.
    Removed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Accepted => "accepted",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a document version in the doctracker family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Active,
    Removed,
    /// Content verification failed. Terminal.
    Invalid,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Removed => "removed",
            Self::Invalid => "invalid",
        }
    }

    /// Whether a version in this status may move to `next`.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Removed) | (Self::Active, Self::Invalid) | (Self::Removed, Self::Invalid)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalid)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposal as stored at its `proposaldata` address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    #[serde(rename = "proposalID")]
    pub proposal_id: String,
    #[serde(rename = "docName")]
    pub doc_name: String,
    pub category: String,
    pub author: String,
    /// User ids that voted for the proposal.
    #[serde(default)]
    pub signers: Vec<String>,
    #[serde(rename = "proposedDocStatus")]
    pub proposed_doc_status: DocumentStatus,
    #[serde(rename = "currentStatus")]
    pub current_status: ProposalStatus,
    #[serde(rename = "contentHash")]
    pub content_hash: String,
}

impl ProposalRecord {
    pub fn document_key(&self) -> DocumentKey {
        DocumentKey::new(self.category.clone(), self.doc_name.clone())
    }

    pub fn is_active(&self) -> bool {
        self.current_status == ProposalStatus::Active
    }
}

/// One committed version of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentVersionRecord {
    #[serde(rename = "proposalID")]
    pub proposal_id: String,
    pub category: String,
    #[serde(rename = "documentName")]
    pub document_name: String,
    #[serde(rename = "contentHash")]
    pub content_hash: String,
    pub status: DocumentStatus,
    pub author: String,
    /// Starts at 1 and only grows per document.
    pub version: u32,
    #[serde(default)]
    pub signers: Vec<String>,
}

impl DocumentVersionRecord {
    pub fn document_key(&self) -> DocumentKey {
        DocumentKey::new(self.category.clone(), self.document_name.clone())
    }
}

/// A proposal about to be written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProposal {
    pub proposal_id: String,
    pub document: DocumentKey,
    pub author: String,
    pub content_hash: String,
    pub proposed_status: DocumentStatus,
}

/// Per-user proposal index in the proposals family. Entries are proposal ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalUserRecord {
    #[serde(default)]
    pub signed: Vec<String>,
    #[serde(default)]
    pub accepted: Vec<String>,
    #[serde(default)]
    pub active: Vec<String>,
}

/// Per-user document index in the doctracker family. Entries are version addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUserRecord {
    #[serde(default)]
    pub authored: Vec<String>,
    #[serde(default)]
    pub signed: Vec<String>,
}

/// Open proposals of one document: proposal id to content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndexRecord {
    #[serde(default)]
    pub proposals: BTreeMap<String, String>,
}

impl DocumentIndexRecord {
    /// Id of an open proposal carrying `content_hash`, if any.
    pub fn proposal_with_hash(&self, content_hash: &str) -> Option<&str> {
        self.proposals
            .iter()
            .find(|(_, hash)| hash.as_str() == content_hash)
            .map(|(id, _)| id.as_str())
    }
}

/// Version number for the next committed version: highest existing plus one.
///
/// Gaps are preserved, so versions `[1, 3]` yield `4`.
pub fn next_document_version<I>(existing: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    existing.into_iter().max().map_or(1, |highest| highest + 1)
}
