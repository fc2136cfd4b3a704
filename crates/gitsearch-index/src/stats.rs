//! Walk state and progress statistics

use std::collections::HashSet;

use crate::formatting::format_number;

/// How many display updates `LogDisplay` lets pass between log lines
pub const LOG_EVERY: usize = 10_000;

/// Read-only view of walk progress
pub trait Statistics {
    /// Nodes classified so far, including repeats through merge parents
    fn processed(&self) -> usize;

    /// Records actually written to the store
    fn written(&self) -> usize;

    /// Unique commit ids seen (includes the pre-history boundary)
    fn visited(&self) -> usize;

    /// Merge commits waiting for the second phase
    fn to_visit(&self) -> usize;
}

/// State of a single walk
///
/// Created fresh for every run. The `visited` and `to_visit` counts are read
/// straight off the collections rather than tracked separately.
#[derive(Debug, Default)]
pub struct WalkState {
    visited: HashSet<String>,
    to_visit: Vec<String>,
    processed: usize,
    written: usize,
}

impl WalkState {
    /// Creates a state with the boundary already marked visited
    pub fn new(boundary: &str) -> Self {
        let mut state = Self::default();
        state.visited.insert(boundary.to_string());
        state
    }

    /// Marks a commit visited. Returns `false` if it already was.
    pub fn visit(&mut self, id: &str) -> bool {
        if self.visited.contains(id) {
            return false;
        }
        self.visited.insert(id.to_string())
    }

    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    /// Queues a merge commit for the second phase
    pub fn defer(&mut self, merge_id: String) {
        self.to_visit.push(merge_id);
    }

    /// Most recently queued merge commit
    pub fn pop_deferred(&mut self) -> Option<String> {
        self.to_visit.pop()
    }

    pub fn processed_commit(&mut self) {
        self.processed += 1;
    }

    pub fn wrote_commit(&mut self) {
        self.written += 1;
    }
}

impl Statistics for WalkState {
    fn processed(&self) -> usize {
        self.processed
    }

    fn written(&self) -> usize {
        self.written
    }

    fn visited(&self) -> usize {
        self.visited.len()
    }

    fn to_visit(&self) -> usize {
        self.to_visit.len()
    }
}

/// Sink the walker reports to after every node it touches
pub trait StatisticsDisplay {
    fn update(&mut self, stats: &dyn Statistics);
}

impl<T: StatisticsDisplay + ?Sized> StatisticsDisplay for &mut T {
    fn update(&mut self, stats: &dyn Statistics) {
        (**self).update(stats)
    }
}

impl<T: StatisticsDisplay + ?Sized> StatisticsDisplay for Box<T> {
    fn update(&mut self, stats: &dyn Statistics) {
        (**self).update(stats)
    }
}

/// Discards every update
#[derive(Debug, Default)]
pub struct NullDisplay;

impl StatisticsDisplay for NullDisplay {
    fn update(&mut self, _stats: &dyn Statistics) {}
}

/// Logs a one-line summary every `every` updates
#[derive(Debug)]
pub struct LogDisplay {
    every: usize,
    updates: usize,
}

impl LogDisplay {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            updates: 0,
        }
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new(LOG_EVERY)
    }
}

impl StatisticsDisplay for LogDisplay {
    fn update(&mut self, stats: &dyn Statistics) {
        self.updates = (self.updates + 1) % self.every;
        if self.updates == 0 {
            log::info!(
                "Unique: {} | Visited: {} | Queued: {} | Written: {}",
                format_number(stats.visited()),
                format_number(stats.processed()),
                format_number(stats.to_visit()),
                format_number(stats.written())
            );
        }
    }
}
