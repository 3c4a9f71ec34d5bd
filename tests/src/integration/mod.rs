//! Cross-crate integration flows.

mod addressing;
mod documents;
mod events;
mod proposals;
mod submission;
