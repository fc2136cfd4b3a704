//! Gitsearch Core - Shared data models for the commit indexer
//!
//! This crate defines the data structures passed between the walker, the
//! store and the CLI: `CommitRecord`, `UpdateSession`, and the `RepoIdentity`
//! derived from a repository's remote URL.

mod error;
mod identity;
mod models;

pub use error::CoreError;
pub use identity::{Origin, RepoIdentity};
pub use models::{format_commit_date, record_key, CommitRecord, UpdateSession, KEY_SEPARATOR};
