//! Address type, namespaces and the generic segment layout.

use shared_crypto::sha512_hex;
use shared_types::LedgerError;
use std::fmt;

/// Total address length in hex chars.
pub const ADDRESS_LEN: usize = 70;
/// Length of the namespace and of the sub-prefix segment.
pub const PREFIX_LEN: usize = 6;
/// Namespace plus sub-prefix.
pub const RANGE_PREFIX_LEN: usize = 2 * PREFIX_LEN;
/// Chars left for the business keys.
pub const IDENTITY_LEN: usize = ADDRESS_LEN - RANGE_PREFIX_LEN;

/// A full 70-char state address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub(crate) String);

impl Address {
    /// Accept an address read back from ledger state.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        if raw.len() != ADDRESS_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LedgerError::Decode(format!("malformed state address {raw:?}")));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the address falls under the given range prefix.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// One piece of the identity segment.
#[derive(Debug, Clone, Copy)]
pub enum Segment<'a> {
    /// First `width` chars of SHA-512(key).
    Hashed(&'a str, usize),
    /// Taken verbatim (already hex or decimal).
    Literal(&'a str),
}

impl Segment<'_> {
    fn render(&self, out: &mut String) {
        match *self {
            Segment::Hashed(key, width) => out.push_str(&sha512_hex(key.as_bytes())[..width]),
            Segment::Literal(text) => out.push_str(text),
        }
    }

    fn width(&self) -> usize {
        match *self {
            Segment::Hashed(_, width) => width,
            Segment::Literal(text) => text.len(),
        }
    }
}

/// A family namespace with its hashed 6-char prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    family: String,
    prefix: String,
}

impl Namespace {
    pub fn new(family: impl Into<String>) -> Self {
        let family = family.into();
        let prefix = sha512_hex(family.as_bytes())[..PREFIX_LEN].to_string();
        Self { family, prefix }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Hash a record kind under this namespace.
    pub fn sub_prefix(&self, kind: &str) -> SubPrefix {
        let mut range = String::with_capacity(RANGE_PREFIX_LEN);
        range.push_str(&self.prefix);
        range.push_str(&sha512_hex(kind.as_bytes())[..PREFIX_LEN]);
        SubPrefix {
            kind: kind.to_string(),
            range,
        }
    }

    /// `address(family, sub_prefix, parts...)` with the default layout.
    pub fn address(&self, kind: &str, parts: &[&str]) -> Result<String, LedgerError> {
        self.sub_prefix(kind).address(parts)
    }
}

/// A namespace plus hashed record kind: the 12-char range prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPrefix {
    kind: String,
    range: String,
}

impl SubPrefix {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Prefix matching every record of this kind.
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Default layout: every part but the last takes 6 chars, the last fills
    /// the identity segment. No parts gives the range prefix.
    pub fn address(&self, parts: &[&str]) -> Result<String, LedgerError> {
        let Some((last, leading)) = parts.split_last() else {
            return Ok(self.range.clone());
        };
        let leading_width = leading.len() * PREFIX_LEN;
        if leading_width >= IDENTITY_LEN {
            return Err(LedgerError::InvalidInput(format!(
                "{} key parts do not fit the identity segment",
                parts.len()
            )));
        }

        let mut segments: Vec<Segment<'_>> = leading
            .iter()
            .map(|part| Segment::Hashed(*part, PREFIX_LEN))
            .collect();
        segments.push(Segment::Hashed(*last, IDENTITY_LEN - leading_width));
        Ok(self.compose(&segments))
    }

    /// Explicit layout. The caller is responsible for the total width.
    pub fn compose(&self, segments: &[Segment<'_>]) -> String {
        let width: usize = segments.iter().map(Segment::width).sum();
        let mut out = String::with_capacity(RANGE_PREFIX_LEN + width);
        out.push_str(&self.range);
        for segment in segments {
            segment.render(&mut out);
        }
        out
    }

    /// Explicit layout that must come out as a full address.
    pub fn full(&self, segments: &[Segment<'_>]) -> Result<Address, LedgerError> {
        let composed = self.compose(segments);
        if composed.len() != ADDRESS_LEN {
            return Err(LedgerError::InvalidInput(format!(
                "{} address is {} chars, expected {ADDRESS_LEN}",
                self.kind,
                composed.len()
            )));
        }
        Ok(Address(composed))
    }

    /// Layout whose widths are fixed at compile time.
    pub(crate) fn fixed(&self, segments: &[Segment<'_>]) -> Address {
        let composed = self.compose(segments);
        debug_assert_eq!(composed.len(), ADDRESS_LEN, "{} layout", self.kind);
        Address(composed)
    }
}
