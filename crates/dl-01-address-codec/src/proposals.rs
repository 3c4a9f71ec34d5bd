//! Addresses of the `proposals` family.
//!
//! | Kind | Identity segment |
//! |------|------------------|
//! | `proposaldata` | SHA-512(proposal id), 58 chars |
//! | `user` | SHA-512(user id), 58 chars |
//! | `doc` | SHA-512(category), 6 chars + SHA-512(document name), 52 chars |

use crate::address::{Address, Namespace, Segment, SubPrefix, IDENTITY_LEN, PREFIX_LEN};
use shared_types::DocumentKey;
use std::sync::OnceLock;

pub const FAMILY_NAME: &str = "proposals";
pub const FAMILY_VERSION: &str = "1.0";

const PROPOSAL_KIND: &str = "proposaldata";
const USER_KIND: &str = "user";
const DOC_KIND: &str = "doc";

static GLOBAL: OnceLock<ProposalAddresses> = OnceLock::new();

/// Pre-hashed prefixes of the proposals family.
#[derive(Debug, Clone)]
pub struct ProposalAddresses {
    namespace: Namespace,
    proposal: SubPrefix,
    user: SubPrefix,
    doc: SubPrefix,
}

impl Default for ProposalAddresses {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalAddresses {
    pub fn new() -> Self {
        let namespace = Namespace::new(FAMILY_NAME);
        Self {
            proposal: namespace.sub_prefix(PROPOSAL_KIND),
            user: namespace.sub_prefix(USER_KIND),
            doc: namespace.sub_prefix(DOC_KIND),
            namespace,
        }
    }

    /// Process-wide instance, hashed on first use.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn proposal(&self, proposal_id: &str) -> Address {
        self.proposal.fixed(&[Segment::Hashed(proposal_id, IDENTITY_LEN)])
    }

    /// Range prefix over every proposal record.
    pub fn proposal_range(&self) -> &str {
        self.proposal.range()
    }

    pub fn user(&self, user_id: &str) -> Address {
        self.user.fixed(&[Segment::Hashed(user_id, IDENTITY_LEN)])
    }

    pub fn document(&self, key: &DocumentKey) -> Address {
        self.doc.fixed(&[
            Segment::Hashed(&key.category, PREFIX_LEN),
            Segment::Hashed(&key.name, IDENTITY_LEN - PREFIX_LEN),
        ])
    }
}
