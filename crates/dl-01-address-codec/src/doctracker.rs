//! Addresses of the `doctracker` family.
//!
//! A document owns a 66-char prefix (category 6 + name 48 hashed chars) and
//! each version appends its zero-padded 4-digit number, so a range read on
//! the prefix returns every version of the document.

use crate::address::{Address, Namespace, Segment, SubPrefix, IDENTITY_LEN, PREFIX_LEN};
use shared_types::{DocumentKey, LedgerError};
use std::sync::OnceLock;

pub const FAMILY_NAME: &str = "doctracker";
pub const FAMILY_VERSION: &str = "1.0";

const DOC_KIND: &str = "doc";
const USER_KIND: &str = "user";

/// Digits reserved for the version number.
pub const VERSION_WIDTH: usize = 4;
/// Highest version that fits the version segment.
pub const MAX_VERSION: u32 = 9999;

const NAME_WIDTH: usize = IDENTITY_LEN - PREFIX_LEN - VERSION_WIDTH;

static GLOBAL: OnceLock<DocTrackerAddresses> = OnceLock::new();

/// Pre-hashed prefixes of the doctracker family.
#[derive(Debug, Clone)]
pub struct DocTrackerAddresses {
    namespace: Namespace,
    doc: SubPrefix,
    user: SubPrefix,
}

impl Default for DocTrackerAddresses {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTrackerAddresses {
    pub fn new() -> Self {
        let namespace = Namespace::new(FAMILY_NAME);
        Self {
            doc: namespace.sub_prefix(DOC_KIND),
            user: namespace.sub_prefix(USER_KIND),
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

    /// 66-char prefix shared by every version of the document.
    pub fn document_prefix(&self, key: &DocumentKey) -> String {
        self.doc.compose(&[
            Segment::Hashed(&key.category, PREFIX_LEN),
            Segment::Hashed(&key.name, NAME_WIDTH),
        ])
    }

    pub fn document_version(&self, key: &DocumentKey, version: u32) -> Result<Address, LedgerError> {
        if version == 0 || version > MAX_VERSION {
            return Err(LedgerError::InvalidInput(format!(
                "document version {version} outside 1..={MAX_VERSION}"
            )));
        }
        let digits = format!("{version:0width$}", width = VERSION_WIDTH);
        self.doc.full(&[
            Segment::Hashed(&key.category, PREFIX_LEN),
            Segment::Hashed(&key.name, NAME_WIDTH),
            Segment::Literal(&digits),
        ])
    }

    pub fn user(&self, user_id: &str) -> Address {
        self.user.fixed(&[Segment::Hashed(user_id, IDENTITY_LEN)])
    }
}
