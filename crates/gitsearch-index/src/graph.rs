//! Read-only view of a commit graph

use anyhow::Result;

/// A commit as seen by the walker
///
/// Owned data keyed by id, so nodes stay valid even if the adapter reopens
/// its underlying repository handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNode {
    /// Full commit SHA
    pub id: String,

    /// Parent SHAs in the order the repository records them
    pub parent_ids: Vec<String>,

    pub author_name: String,

    pub author_email: String,

    /// Committer time (Unix epoch seconds)
    pub commit_time: i64,

    pub message: String,
}

impl CommitNode {
    pub fn parent_count(&self) -> usize {
        self.parent_ids.len()
    }

    /// The first parent, i.e. the history of the branch the commit was made on
    pub fn first_parent(&self) -> Option<&str> {
        self.parent_ids.first().map(String::as_str)
    }
}

/// Access to commits, parents and per-commit changed files
pub trait CommitGraph {
    /// The commit HEAD points at, `None` for a repository without commits
    fn head(&mut self) -> Result<Option<CommitNode>>;

    /// Looks up a commit by id. A missing commit is an error.
    fn lookup(&mut self, id: &str) -> Result<CommitNode>;

    /// Parents of a commit in recorded order
    fn parents(&mut self, node: &CommitNode) -> Result<Vec<CommitNode>> {
        node.parent_ids.iter().map(|id| self.lookup(id)).collect()
    }

    /// Paths changed by the commit relative to its first parent.
    ///
    /// Expensive; the walker calls it at most once per written record.
    fn changed_files(&mut self, node: &CommitNode) -> Result<Vec<String>>;
}

impl<T: CommitGraph + ?Sized> CommitGraph for &mut T {
    fn head(&mut self) -> Result<Option<CommitNode>> {
        (**self).head()
    }

    fn lookup(&mut self, id: &str) -> Result<CommitNode> {
        (**self).lookup(id)
    }

    fn parents(&mut self, node: &CommitNode) -> Result<Vec<CommitNode>> {
        (**self).parents(node)
    }

    fn changed_files(&mut self, node: &CommitNode) -> Result<Vec<String>> {
        (**self).changed_files(node)
    }
}
