//! Gitsearch Index - Commit graph walker
//!
//! This crate is responsible for:
//! - Reading commits, parents and changed files from a git repository
//! - Walking the commit graph from HEAD down to the pre-history boundary
//! - Attributing every non-merge commit to the pull request that landed it
//! - Writing each commit at most once per repository, across runs
//! - Wrapping walks in update sessions

mod formatting;
mod git_graph;
mod graph;
pub mod merge_message;
mod session;
mod stats;
mod store;
mod walker;

pub use formatting::{format_number, short_id};
pub use git_graph::GitCommitGraph;
pub use graph::{CommitGraph, CommitNode};
pub use merge_message::{extract_pr_number, is_integration_merge, MERGE_PR_PREFIX};
pub use session::{run_update, UpdateOutcome};
pub use stats::{LogDisplay, NullDisplay, Statistics, StatisticsDisplay, WalkState, LOG_EVERY};
pub use store::CommitStore;
pub use walker::{CommitWalker, PRE_HISTORY_ID};
