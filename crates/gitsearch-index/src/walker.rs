//! Two-phase commit graph walk
//!
//! Phase one follows first parents from HEAD down to the pre-history
//! boundary, writing single-parent commits straight away and queueing merge
//! commits. Phase two pops the queued merges (most recent last in, first
//! out) and walks every not-yet-seen parent, attributing the commits found
//! to the pull request whose merge brought them in.

use anyhow::{Context, Result};
use gitsearch_core::{format_commit_date, CommitRecord, RepoIdentity};
use std::time::Instant;

use crate::formatting::{format_duration, format_number, format_unix_timestamp, short_id};
use crate::graph::{CommitGraph, CommitNode};
use crate::merge_message::{extract_pr_number, is_integration_merge};
use crate::stats::{Statistics, StatisticsDisplay, WalkState};
use crate::store::CommitStore;

/// Commit treated as already visited before every walk. History behind it
/// is an import that is never indexed.
pub const PRE_HISTORY_ID: &str = "53ef49c5f0b2711409a7e295a2d515e70850415e";

/// Pending work of the merge phase
///
/// Each variant is a resumable point of the merge resolution, so nested
/// merges never grow the call stack.
enum Step {
    /// Resolve one merge parent and its own ancestry
    Resolve {
        target: CommitNode,
        merge_via: Vec<String>,
        pr: String,
    },

    /// Keep following single-parent ancestors starting at `next`
    Chain {
        next: Option<String>,
        merge_via: Vec<String>,
        pr: String,
    },

    /// Keep walking the parents of a merge starting at `index`
    Parents {
        parents: Vec<String>,
        index: usize,
        merge_via: Vec<String>,
        pr: String,
    },
}

/// Turns a commit graph into deduplicated, PR-attributed commit records
pub struct CommitWalker<'a, G, S, D> {
    graph: G,
    store: &'a S,
    display: D,
    identity: RepoIdentity,
    boundary: String,
}

impl<'a, G, S, D> CommitWalker<'a, G, S, D>
where
    G: CommitGraph,
    S: CommitStore,
    D: StatisticsDisplay,
{
    pub fn new(graph: G, store: &'a S, display: D, identity: RepoIdentity) -> Self {
        Self {
            graph,
            store,
            display,
            identity,
            boundary: PRE_HISTORY_ID.to_string(),
        }
    }

    /// Replaces the pre-history boundary
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = boundary.into();
        self
    }

    pub fn identity(&self) -> &RepoIdentity {
        &self.identity
    }

    /// Walks the whole history window and returns the number of records written
    pub fn run(&mut self) -> Result<usize> {
        let start_time = Instant::now();
        let mut state = WalkState::new(&self.boundary);

        self.sweep_mainline(&mut state)
            .with_context(|| format!("Mainline walk of {} failed", self.identity))?;

        log::info!(
            "Mainline of {} done: {} commits seen, {} merges queued",
            self.identity,
            format_number(state.visited()),
            format_number(state.to_visit())
        );

        self.resolve_merges(&mut state)
            .with_context(|| format!("Merge walk of {} failed", self.identity))?;

        log::info!(
            "Walk of {} finished in {}: {} unique, {} visited, {} written",
            self.identity,
            format_duration(start_time.elapsed()),
            format_number(state.visited()),
            format_number(state.processed()),
            format_number(state.written())
        );

        Ok(state.written())
    }

    /// Phase one: first-parent walk from HEAD to the boundary
    fn sweep_mainline(&mut self, state: &mut WalkState) -> Result<()> {
        let mut current = self.graph.head()?;

        match &current {
            Some(head) => log::info!(
                "Walking {} from {} ({})",
                self.identity,
                short_id(&head.id),
                format_unix_timestamp(head.commit_time)
            ),
            None => log::info!("{} has no commits", self.identity),
        }

        while let Some(commit) = current {
            if commit.id == self.boundary {
                break;
            }

            if state.visit(&commit.id) {
                match commit.parent_count() {
                    1 => {
                        state.processed_commit();
                        self.write_commit(state, &commit, "", &[])?;
                    }
                    0 => log::debug!("Reached root commit {}", short_id(&commit.id)),
                    _ => state.defer(commit.id.clone()),
                }
            }

            // The boundary need not exist in the graph, so stop before looking it up
            current = match commit.first_parent() {
                Some(parent) if parent == self.boundary => None,
                Some(parent) => Some(self.graph.lookup(parent)?),
                None => None,
            };
            self.display.update(&*state);
        }

        Ok(())
    }

    /// Phase two: attribute everything the queued merges brought in
    fn resolve_merges(&mut self, state: &mut WalkState) -> Result<()> {
        let mut work = Vec::new();

        while let Some(merge_id) = state.pop_deferred() {
            let merge = self.graph.lookup(&merge_id)?;
            state.processed_commit();

            let pr = extract_pr_number(&merge.message);
            log::debug!(
                "Resolving merge {} (PR {:?}, {} parents)",
                short_id(&merge.id),
                pr,
                merge.parent_count()
            );

            work.push(Step::Parents {
                parents: merge.parent_ids,
                index: 0,
                merge_via: vec![merge.id],
                pr,
            });
            while let Some(step) = work.pop() {
                self.step(state, &mut work, step)?;
            }

            self.display.update(&*state);
        }

        Ok(())
    }

    fn step(&mut self, state: &mut WalkState, work: &mut Vec<Step>, step: Step) -> Result<()> {
        match step {
            Step::Parents {
                parents,
                mut index,
                merge_via,
                pr,
            } => {
                while index < parents.len() {
                    let parent_id = &parents[index];
                    index += 1;

                    if state.is_visited(parent_id) || *parent_id == self.boundary {
                        continue;
                    }
                    state.processed_commit();

                    let parent = self.graph.lookup(parent_id)?;
                    if is_integration_merge(&parent.message) {
                        log::debug!("Skipping integration merge {}", short_id(&parent.id));
                        state.visit(&parent.id);
                        continue;
                    }

                    // Come back for the remaining parents once this one is done
                    work.push(Step::Parents {
                        parents,
                        index,
                        merge_via: merge_via.clone(),
                        pr: pr.clone(),
                    });
                    work.push(Step::Resolve {
                        target: parent,
                        merge_via,
                        pr,
                    });
                    return Ok(());
                }
            }

            Step::Resolve {
                target,
                merge_via,
                pr,
            } => {
                state.visit(&target.id);
                state.processed_commit();

                let mut extended = merge_via.clone();
                extended.push(target.id.clone());
                self.display.update(&*state);

                if target.parent_count() == 1 {
                    self.write_commit(state, &target, &pr, &merge_via)?;
                    work.push(Step::Chain {
                        next: target.first_parent().map(str::to_string),
                        merge_via: extended,
                        pr,
                    });
                } else {
                    // The innermost PR merge gets the credit, not the
                    // outer merges that carried it along
                    let inner_pr = extract_pr_number(&target.message);
                    work.push(Step::Parents {
                        parents: target.parent_ids,
                        index: 0,
                        merge_via: extended,
                        pr: inner_pr,
                    });
                }
            }

            Step::Chain {
                mut next,
                merge_via,
                pr,
            } => {
                while let Some(id) = next.take() {
                    if state.is_visited(&id) || id == self.boundary {
                        break;
                    }

                    let commit = self.graph.lookup(&id)?;
                    if commit.parent_count() == 1 {
                        state.visit(&commit.id);
                        state.processed_commit();
                        self.write_commit(state, &commit, &pr, &merge_via)?;
                        next = commit.first_parent().map(str::to_string);
                        self.display.update(&*state);
                    } else {
                        work.push(Step::Chain {
                            next: commit.first_parent().map(str::to_string),
                            merge_via: merge_via.clone(),
                            pr: pr.clone(),
                        });
                        work.push(Step::Resolve {
                            target: commit,
                            merge_via,
                            pr,
                        });
                        return Ok(());
                    }
                }
            }
        }

        Ok(())
    }

    /// Writes a record unless the store already has it
    fn write_commit(
        &mut self,
        state: &mut WalkState,
        commit: &CommitNode,
        pr: &str,
        merge_via: &[String],
    ) -> Result<()> {
        let identity = &self.identity;
        if self
            .store
            .exists(&commit.id, &identity.project, &identity.repo)?
        {
            log::debug!("Commit {} already indexed", short_id(&commit.id));
            return Ok(());
        }

        let files = self.graph.changed_files(commit)?;
        let record = CommitRecord::new(
            commit.id.clone(),
            identity.project.clone(),
            identity.repo.clone(),
            commit.message.split('\n').map(|l| l.trim().to_string()).collect(),
            commit.author_name.clone(),
            commit.author_email.clone(),
            format_commit_date(commit.commit_time),
            files,
            pr.to_string(),
            merge_via.to_vec(),
            identity.origin,
        )
        .with_context(|| format!("Failed to build record for {}", commit.id))?;

        let inserted = self
            .store
            .add(&record)
            .with_context(|| format!("Failed to store commit {}", commit.id))?;
        if !inserted {
            log::debug!("Commit {} was stored concurrently", short_id(&commit.id));
            return Ok(());
        }
        state.wrote_commit();

        log::debug!(
            "Wrote {} (PR {:?}, via {} merges)",
            short_id(&commit.id),
            pr,
            merge_via.len()
        );
        Ok(())
    }
}
