//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod discover;
pub mod motifs;
pub mod search;
pub mod version;
