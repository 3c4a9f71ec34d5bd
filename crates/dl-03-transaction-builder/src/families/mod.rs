//! Transaction constructors for the application's families.
//!
//! Each constructor declares every address its action reads or writes.

pub mod doctracker;
pub mod proposals;

/// Keep the first occurrence of each address.
pub(crate) fn dedup(addresses: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    addresses
        .into_iter()
        .filter(|address| seen.insert(address.clone()))
        .collect()
}
