//! Database operations and management

use anyhow::{Context, Result};
use data_encoding::HEXLOWER_PERMISSIVE;
use gitsearch_core::{record_key, CommitRecord, Origin};
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Compact binary storage format
// ---------------------------------------------------------------------------

/// Internal representation stored in sled. Commit ids (the record's own and
/// every entry of the merge-via chain) are kept as raw bytes instead of hex
/// strings, which halves their size.
#[derive(Serialize, Deserialize)]
struct StoredCommit {
    commit_id: Vec<u8>,
    project: String,
    repo: String,
    description: Vec<String>,
    author_name: String,
    author_email: String,
    date: String,
    files: Vec<String>,
    pr: String,
    merge_via: Vec<Vec<u8>>,
    origin: Origin,
}

fn decode_sha(sha: &str) -> Result<Vec<u8>> {
    HEXLOWER_PERMISSIVE
        .decode(sha.as_bytes())
        .with_context(|| format!("Invalid commit SHA hex encoding: {}", sha))
}

/// Serialize a `CommitRecord` into compact binary bytes.
fn pack(record: &CommitRecord) -> Result<Vec<u8>> {
    let merge_via = record
        .merge_via
        .iter()
        .map(|sha| decode_sha(sha))
        .collect::<Result<Vec<_>>>()?;

    let stored = StoredCommit {
        commit_id: decode_sha(&record.commit_id)?,
        project: record.project.clone(),
        repo: record.repo.clone(),
        description: record.description.clone(),
        author_name: record.author_name.clone(),
        author_email: record.author_email.clone(),
        date: record.date.clone(),
        files: record.files.clone(),
        pr: record.pr.clone(),
        merge_via,
        origin: record.origin,
    };
    bincode::serialize(&stored).context("Failed to serialize CommitRecord")
}

/// Deserialize a `CommitRecord` from compact binary bytes.
fn unpack(bytes: &[u8]) -> Result<CommitRecord> {
    let stored: StoredCommit =
        bincode::deserialize(bytes).context("Failed to deserialize CommitRecord")?;
    Ok(CommitRecord {
        commit_id: HEXLOWER_PERMISSIVE.encode(&stored.commit_id),
        project: stored.project,
        repo: stored.repo,
        description: stored.description,
        author_name: stored.author_name,
        author_email: stored.author_email,
        date: stored.date,
        files: stored.files,
        pr: stored.pr,
        merge_via: stored
            .merge_via
            .iter()
            .map(|sha| HEXLOWER_PERMISSIVE.encode(sha))
            .collect(),
        origin: stored.origin,
    })
}

/// Main structure managing the database
pub struct GitSearchDb {
    /// Tree storing commit records (key: "project:repo:commit_id")
    pub(crate) commits: sled::Tree,

    /// Tree storing update sessions (key: big-endian session id)
    pub(crate) sessions: sled::Tree,

    /// Sled database instance
    pub(crate) db: Db,

    /// Path to the database directory
    path: PathBuf,
}

impl GitSearchDb {
    /// Opens or creates a new database at the specified location
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", path.as_ref()))?;

        let commits = db
            .open_tree("commits")
            .context("Failed to open commits tree")?;

        let sessions = db
            .open_tree("sessions")
            .context("Failed to open sessions tree")?;

        Ok(Self {
            commits,
            sessions,
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Checks if a commit has already been stored for the given repository
    pub fn contains_commit(&self, commit_id: &str, project: &str, repo: &str) -> Result<bool> {
        let key = record_key(commit_id, project, repo);
        self.commits
            .contains_key(key.as_bytes())
            .context("Failed to check commit existence")
    }

    /// Stores a commit record.
    ///
    /// Returns `false` without touching the stored value when a record with
    /// the same key is already present.
    pub fn add(&self, record: &CommitRecord) -> Result<bool> {
        let key = record.key();
        let value = pack(record)?;

        let previous = self
            .commits
            .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(value))
            .context("Failed to insert commit record")?;

        match previous {
            Ok(()) => Ok(true),
            Err(_) => {
                log::debug!("Commit {} already stored, keeping existing record", key);
                Ok(false)
            }
        }
    }

    /// Retrieves a commit record
    pub fn get(&self, commit_id: &str, project: &str, repo: &str) -> Result<Option<CommitRecord>> {
        let key = record_key(commit_id, project, repo);

        match self.commits.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(unpack(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Retrieves every stored commit of one repository
    pub fn commits_for_repo(&self, project: &str, repo: &str) -> Result<Vec<CommitRecord>> {
        let prefix = record_key("", project, repo);
        let mut results = Vec::new();

        for item in self.commits.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item.context("Failed to read from database")?;
            results.push(unpack(&value)?);
        }

        // Newest first; the date format sorts lexicographically
        results.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(results)
    }

    /// Returns the total number of stored commit records
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Checks if database is empty (nothing indexed yet)
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Returns total on-disk size of the database directory in bytes.
    pub fn db_size_bytes(&self) -> u64 {
        fn dir_size(path: &Path) -> u64 {
            let Ok(entries) = std::fs::read_dir(path) else { return 0; };
            entries.flatten().map(|e| {
                let p = e.path();
                if p.is_dir() {
                    dir_size(&p)
                } else {
                    e.metadata().map(|m| m.len()).unwrap_or(0)
                }
            }).sum()
        }
        dir_size(&self.path)
    }

    /// Flushes all pending operations to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush database")?;
        Ok(())
    }
}
