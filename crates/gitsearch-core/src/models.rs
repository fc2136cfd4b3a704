//! Core data models for the indexer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::identity::Origin;

/// Commit record in the database
///
/// One record exists per (commit_id, project, repo). Merge commits are never
/// stored; their ids only show up in the `merge_via` chain of the commits
/// they brought in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full commit SHA (lowercase hex)
    pub commit_id: String,

    /// Project (owner / organisation) the repository lives under
    pub project: String,

    /// Repository name
    pub repo: String,

    /// Commit message, one trimmed entry per line
    pub description: Vec<String>,

    pub author_name: String,

    pub author_email: String,

    /// Committer time in UTC, `yyyyMMddTHHmmssfffffffZ`
    pub date: String,

    /// Paths changed relative to the first parent
    pub files: Vec<String>,

    /// Pull request number that landed the commit, empty for direct commits
    pub pr: String,

    /// Merge commits walked through to reach this commit, outermost first
    pub merge_via: Vec<String>,

    /// Hosting system the repository was cloned from
    pub origin: Origin,
}

impl CommitRecord {
    /// Creates a new commit record, rejecting empty identifying fields
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        commit_id: String,
        project: String,
        repo: String,
        description: Vec<String>,
        author_name: String,
        author_email: String,
        date: String,
        files: Vec<String>,
        pr: String,
        merge_via: Vec<String>,
        origin: Origin,
    ) -> Result<Self, CoreError> {
        if commit_id.trim().is_empty() {
            return Err(CoreError::InvalidRecord("commit id not specified".to_string()));
        }
        if repo.trim().is_empty() {
            return Err(CoreError::InvalidRecord("repo name not specified".to_string()));
        }
        if project.contains(KEY_SEPARATOR) || repo.contains(KEY_SEPARATOR) {
            return Err(CoreError::InvalidRecord(format!(
                "{}/{} contains the key separator {:?}",
                project, repo, KEY_SEPARATOR
            )));
        }
        // A commit without an author is treated as corrupt history and
        // aborts the walk, like a failing adapter would
        if author_name.trim().is_empty() {
            return Err(CoreError::InvalidRecord(format!(
                "author name not specified for {}",
                commit_id
            )));
        }
        if date.trim().is_empty() {
            return Err(CoreError::InvalidRecord(format!("date not specified for {}", commit_id)));
        }

        Ok(Self {
            commit_id,
            project,
            repo,
            description,
            author_name,
            author_email,
            date,
            files,
            pr,
            merge_via,
            origin,
        })
    }

    /// Generates a key for database storage
    /// Format: "project:repo:commit_id"
    pub fn key(&self) -> String {
        record_key(&self.commit_id, &self.project, &self.repo)
    }

    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.description.first().map(String::as_str).unwrap_or("")
    }
}

/// Joins the parts of a storage key; never allowed inside a project or repo name
pub const KEY_SEPARATOR: char = ':';

/// Storage key for a commit within a (project, repo) scope
pub fn record_key(commit_id: &str, project: &str, repo: &str) -> String {
    format!("{}{sep}{}{sep}{}", project, repo, commit_id, sep = KEY_SEPARATOR)
}

/// Formats a committer timestamp (Unix seconds) as `yyyyMMddTHHmmssfffffffZ`.
///
/// Git stores whole seconds, so the seven fractional digits are always zero.
pub fn format_commit_date(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| format!("{}0000000Z", dt.format("%Y%m%dT%H%M%S")))
        .unwrap_or_default()
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.commit_id.get(..8).unwrap_or(&self.commit_id);
        if self.pr.is_empty() {
            write!(f, "{} {}/{} {}", short, self.project, self.repo, self.summary())
        } else {
            write!(
                f,
                "{} {}/{} (PR #{}) {}",
                short,
                self.project,
                self.repo,
                self.pr,
                self.summary()
            )
        }
    }
}

/// One indexing run for a repository
///
/// A session with no `started` time is scheduled; one with `started` but no
/// `finished` is in progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateSession {
    pub id: u64,
    pub repo: String,
    pub project: String,
    pub started: Option<DateTime<Utc>>,
    pub finished: Option<DateTime<Utc>>,
    pub commits_written: Option<u64>,
}

impl UpdateSession {
    pub fn is_scheduled(&self) -> bool {
        self.started.is_none()
    }

    pub fn is_in_progress(&self) -> bool {
        self.started.is_some() && self.finished.is_none()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }
}
