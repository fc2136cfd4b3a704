//! Index command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use gitsearch_core::{Origin, RepoIdentity};
use gitsearch_db::GitSearchDb;
use gitsearch_index::{
    format_number, run_update, CommitWalker, GitCommitGraph, LogDisplay, StatisticsDisplay,
    UpdateOutcome,
};
use std::path::PathBuf;

use crate::progress::LiveDisplay;

/// Flags of the `index` subcommand
pub struct IndexOptions {
    pub repo: PathBuf,
    pub remote: String,
    pub project: Option<String>,
    pub repo_name: Option<String>,
    pub boundary: Option<String>,
    pub recycle_after: usize,
    pub live: bool,
    pub force: bool,
}

/// Indexes a local repository inside update sessions
pub fn cmd_index(options: IndexOptions, db: GitSearchDb) -> Result<()> {
    log::info!("Starting indexing of repository at {:?}", options.repo);

    let graph = GitCommitGraph::open(&options.repo)
        .context("Failed to open repository")?
        .with_recycle_after(options.recycle_after);
    let identity = resolve_identity(&graph, &options)?;
    log::info!("Indexing as {} ({})", identity, identity.origin);

    if options.recycle_after > 0 {
        log::info!("Reopening repository every {} diffs", options.recycle_after);
    }

    let display: Box<dyn StatisticsDisplay> = if options.live {
        Box::new(LiveDisplay::new())
    } else {
        Box::new(LogDisplay::default())
    };

    // The walker compares full ids, so abbreviations and ref names are resolved first
    let boundary = match &options.boundary {
        Some(rev) => Some(
            graph
                .resolve(rev)
                .with_context(|| format!("Invalid --boundary {:?}", rev))?,
        ),
        None => None,
    };

    let mut walker = CommitWalker::new(graph, &db, display, identity.clone());
    if let Some(boundary) = boundary {
        log::info!("Using pre-history boundary {}", boundary);
        walker = walker.with_boundary(boundary);
    }

    let outcome = run_update(&db, &identity, options.force, || walker.run())
        .with_context(|| format!("Failed to index {}", identity))?;

    match outcome {
        UpdateOutcome::Deferred { scheduled } => {
            println!(
                "{} Update of {} already running, scheduled session {}",
                "⏳".yellow(),
                identity.to_string().bold(),
                scheduled
            );
        }
        UpdateOutcome::Completed { sessions, written } => {
            println!(
                "{} Indexed {}: {} commits written in {} session{}",
                "✅".green(),
                identity.to_string().bold(),
                format_number(written).bold(),
                sessions,
                if sessions == 1 { "" } else { "s" }
            );
        }
    }

    Ok(())
}

/// Project and repository name from the flags, or else from the remote URL
fn resolve_identity(graph: &GitCommitGraph, options: &IndexOptions) -> Result<RepoIdentity> {
    let url = graph.remote_url(&options.remote)?;

    if let (Some(project), Some(repo)) = (&options.project, &options.repo_name) {
        let origin = url
            .as_deref()
            .map(Origin::from_remote_url)
            .unwrap_or(Origin::GitHub);
        return RepoIdentity::try_new(project.clone(), repo.clone(), origin)
            .context("Invalid --project or --repo-name");
    }

    let url = url.with_context(|| {
        format!(
            "Repository at {:?} has no remotes, pass --project and --repo-name",
            options.repo
        )
    })?;
    RepoIdentity::from_remote_url(&url)
        .with_context(|| format!("Cannot derive project and repository from {}", url))
}
