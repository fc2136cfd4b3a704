//! In-memory graph and store shared by the walker tests

#![allow(dead_code)]

use anyhow::{bail, Result};
use gitsearch_core::{record_key, CommitRecord, Origin, RepoIdentity};
use gitsearch_index::{CommitGraph, CommitNode, CommitStore, Statistics, StatisticsDisplay};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const BOUNDARY: &str = "C0";

pub fn identity() -> RepoIdentity {
    RepoIdentity::new("tools", "indexer", Origin::GitHub)
}

pub fn pr_merge(n: u32) -> String {
    format!("Merge pull request #{} in tools/indexer", n)
}

// ── graph ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryGraph {
    commits: HashMap<String, CommitNode>,
    head: Option<String>,
    pub diffs: usize,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a commit; the most recently added one becomes HEAD
    pub fn commit(&mut self, id: &str, parents: &[&str], message: &str) -> &mut Self {
        let node = CommitNode {
            id: id.to_string(),
            parent_ids: parents.iter().map(|p| p.to_string()).collect(),
            author_name: "Jane Doe".to_string(),
            author_email: "jane@example.com".to_string(),
            commit_time: 1_576_233_930 + self.commits.len() as i64,
            message: message.to_string(),
        };
        self.commits.insert(id.to_string(), node);
        self.head = Some(id.to_string());
        self
    }

    pub fn set_head(&mut self, id: &str) -> &mut Self {
        self.head = Some(id.to_string());
        self
    }

    pub fn set_author(&mut self, id: &str, name: &str) -> &mut Self {
        if let Some(node) = self.commits.get_mut(id) {
            node.author_name = name.to_string();
        }
        self
    }

    pub fn node(&self, id: &str) -> &CommitNode {
        &self.commits[id]
    }

    /// Every commit reachable from HEAD through any parent, stopping at `boundary`
    pub fn reachable(&self, boundary: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<String> = self.head.iter().cloned().collect();
        while let Some(id) = stack.pop() {
            if id == boundary || !seen.insert(id.clone()) {
                continue;
            }
            if let Some(node) = self.commits.get(&id) {
                stack.extend(node.parent_ids.iter().cloned());
            }
        }
        seen
    }
}

impl CommitGraph for MemoryGraph {
    fn head(&mut self) -> Result<Option<CommitNode>> {
        Ok(self.head.as_ref().map(|id| self.commits[id].clone()))
    }

    fn lookup(&mut self, id: &str) -> Result<CommitNode> {
        match self.commits.get(id) {
            Some(node) => Ok(node.clone()),
            None => bail!("Missing commit {}", id),
        }
    }

    fn changed_files(&mut self, node: &CommitNode) -> Result<Vec<String>> {
        self.diffs += 1;
        Ok(vec![format!("src/{}.rs", node.id.to_lowercase())])
    }
}

// ── store ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    records: RefCell<BTreeMap<String, CommitRecord>>,
    adds: RefCell<Vec<String>>,
    fail_on: Option<String>,
    /// `exists` always answers `false`, as if another writer raced us
    blind: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(id: &str) -> Self {
        Self {
            fail_on: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn without_exists_check() -> Self {
        Self {
            blind: true,
            ..Self::default()
        }
    }

    pub fn record(&self, id: &str) -> Option<CommitRecord> {
        let identity = identity();
        self.records
            .borrow()
            .get(&record_key(id, &identity.project, &identity.repo))
            .cloned()
    }

    pub fn written_ids(&self) -> BTreeSet<String> {
        self.records
            .borrow()
            .values()
            .map(|r| r.commit_id.clone())
            .collect()
    }

    /// Ids in the order `add` was called, duplicates included
    pub fn adds(&self) -> Vec<String> {
        self.adds.borrow().clone()
    }
}

impl CommitStore for MemoryStore {
    fn exists(&self, commit_id: &str, project: &str, repo: &str) -> Result<bool> {
        if self.blind {
            return Ok(false);
        }
        Ok(self
            .records
            .borrow()
            .contains_key(&record_key(commit_id, project, repo)))
    }

    fn add(&self, record: &CommitRecord) -> Result<bool> {
        if self.fail_on.as_deref() == Some(record.commit_id.as_str()) {
            bail!("Store rejected {}", record.commit_id);
        }
        self.adds.borrow_mut().push(record.commit_id.clone());
        let mut records = self.records.borrow_mut();
        if records.contains_key(&record.key()) {
            return Ok(false);
        }
        records.insert(record.key(), record.clone());
        Ok(true)
    }
}

// ── display ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingDisplay {
    pub updates: usize,
    pub max_queued: usize,
    pub last_written: usize,
}

impl StatisticsDisplay for CountingDisplay {
    fn update(&mut self, stats: &dyn Statistics) {
        self.updates += 1;
        self.max_queued = self.max_queued.max(stats.to_visit());
        self.last_written = stats.written();
    }
}
