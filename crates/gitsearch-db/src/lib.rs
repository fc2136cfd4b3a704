//! Gitsearch DB - Persistence layer for indexed commits
//!
//! This crate manages the local Sled database: commit records keyed by
//! (project, repo, commit id) with an existence check that keeps writes
//! idempotent across runs, and the update sessions that track each run.

mod database;
mod sessions;

pub use database::GitSearchDb;
