//! `CommitGraph` backed by a local git repository

use anyhow::{Context, Result};
use git2::{Commit, ErrorCode, Oid, Repository};
use std::path::{Path, PathBuf};

use crate::graph::{CommitGraph, CommitNode};

/// Git repository adapter
///
/// Can optionally reopen its `Repository` handle after a fixed number of
/// diffs. Nodes handed out are plain owned data, so a reopen is invisible
/// to callers.
pub struct GitCommitGraph {
    /// Path to the git repository
    repo_path: PathBuf,

    repo: Repository,

    /// Reopen the repository after this many diffs (`None` = never)
    recycle_after: Option<usize>,

    /// Diffs computed since the handle was last opened
    diff_calls: usize,
}

impl GitCommitGraph {
    /// Opens the repository at the given path
    pub fn open<P: AsRef<Path>>(repo_path: P) -> Result<Self> {
        let repo = Repository::open(repo_path.as_ref())
            .with_context(|| format!("Failed to open repository at {:?}", repo_path.as_ref()))?;

        Ok(Self {
            repo_path: repo_path.as_ref().to_path_buf(),
            repo,
            recycle_after: None,
            diff_calls: 0,
        })
    }

    /// Reopens the repository handle every `diffs` diff operations; 0 disables
    pub fn with_recycle_after(mut self, diffs: usize) -> Self {
        self.recycle_after = (diffs > 0).then_some(diffs);
        self
    }

    /// URL of the named remote, falling back to the first configured remote
    pub fn remote_url(&self, preferred: &str) -> Result<Option<String>> {
        let names = self.repo.remotes().context("Failed to list remotes")?;

        let name = if names.iter().flatten().any(|n| n == preferred) {
            Some(preferred.to_string())
        } else {
            names.iter().flatten().next().map(str::to_string)
        };

        match name {
            Some(name) => {
                let remote = self
                    .repo
                    .find_remote(&name)
                    .with_context(|| format!("Failed to find remote {}", name))?;
                Ok(remote.url().map(str::to_string))
            }
            None => Ok(None),
        }
    }

    /// Full lowercase id of the commit a revision (short SHA, ref name, ...) names
    pub fn resolve(&self, rev: &str) -> Result<String> {
        let commit = self
            .repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .with_context(|| format!("Failed to resolve {:?} to a commit", rev))?;
        Ok(commit.id().to_string())
    }

    fn find_commit(&self, id: &str) -> Result<Commit<'_>> {
        let oid = Oid::from_str(id).with_context(|| format!("Invalid commit SHA: {}", id))?;
        self.repo
            .find_commit(oid)
            .with_context(|| format!("Failed to find commit {}", id))
    }

    fn recycle_if_needed(&mut self) -> Result<()> {
        if let Some(limit) = self.recycle_after {
            if self.diff_calls >= limit {
                log::debug!("Reopening repository after {} diffs", self.diff_calls);
                self.repo = Repository::open(&self.repo_path)
                    .with_context(|| format!("Failed to reopen repository at {:?}", self.repo_path))?;
                self.diff_calls = 0;
            }
        }
        Ok(())
    }
}

fn to_node(commit: &Commit<'_>) -> CommitNode {
    let author = commit.author();
    CommitNode {
        id: commit.id().to_string(),
        parent_ids: commit.parent_ids().map(|oid| oid.to_string()).collect(),
        author_name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
        author_email: String::from_utf8_lossy(author.email_bytes()).into_owned(),
        commit_time: commit.time().seconds(),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
    }
}

impl CommitGraph for GitCommitGraph {
    fn head(&mut self) -> Result<Option<CommitNode>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to resolve HEAD")),
        };
        let commit = head.peel_to_commit().context("HEAD does not point at a commit")?;
        Ok(Some(to_node(&commit)))
    }

    fn lookup(&mut self, id: &str) -> Result<CommitNode> {
        let commit = self.find_commit(id)?;
        Ok(to_node(&commit))
    }

    fn changed_files(&mut self, node: &CommitNode) -> Result<Vec<String>> {
        self.recycle_if_needed()?;
        self.diff_calls += 1;

        let commit = self.find_commit(&node.id)?;
        let tree = commit.tree().context("Failed to get commit tree")?;
        let parent_tree = if commit.parent_count() > 0 {
            let parent = commit.parent(0).context("Failed to get first parent")?;
            Some(parent.tree().context("Failed to get parent tree")?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .with_context(|| format!("Failed to diff commit {}", node.id))?;

        let files = diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().replace('\\', "/"))
            .collect();

        Ok(files)
    }
}
