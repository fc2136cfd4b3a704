//! Commit persistence as seen by the walker

use anyhow::Result;
use gitsearch_core::CommitRecord;
use gitsearch_db::GitSearchDb;

/// Idempotent commit persistence keyed by (commit id, project, repo)
pub trait CommitStore {
    fn exists(&self, commit_id: &str, project: &str, repo: &str) -> Result<bool>;

    /// Stores a record unless one with the same key is already present.
    /// Returns `false` when the existing record was kept.
    fn add(&self, record: &CommitRecord) -> Result<bool>;
}

impl CommitStore for GitSearchDb {
    fn exists(&self, commit_id: &str, project: &str, repo: &str) -> Result<bool> {
        self.contains_commit(commit_id, project, repo)
    }

    fn add(&self, record: &CommitRecord) -> Result<bool> {
        GitSearchDb::add(self, record)
    }
}
