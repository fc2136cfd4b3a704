//! Gitsearch CLI - Commit index for git repositories
//!
//! Provides:
//! - Indexing of a repository's history with PR attribution
//! - Lookup of single indexed commits
//! - Update session and database statistics

mod commands;
mod output;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitsearch_db::GitSearchDb;
use std::path::PathBuf;

use commands::{cmd_index, cmd_sessions, cmd_show, cmd_stats, IndexOptions};

#[derive(Parser)]
#[command(name = "gitsearch")]
#[command(about = "Indexes git history into a searchable commit store", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the database
    #[arg(short, long, default_value = "./gitsearch.db")]
    database: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Indexes a local git repository
    Index {
        /// Path to the local repository
        #[arg(short, long)]
        repo: PathBuf,

        /// Remote whose URL names the repository
        #[arg(long, default_value = "origin")]
        remote: String,

        /// Project name (overrides the remote URL)
        #[arg(long, requires = "repo_name")]
        project: Option<String>,

        /// Repository name (overrides the remote URL)
        #[arg(long, requires = "project")]
        repo_name: Option<String>,

        /// Commit (SHA, abbreviated SHA or ref) below which history is never indexed
        #[arg(long)]
        boundary: Option<String>,

        /// Reopen the repository after this many diffs (0 = never)
        #[arg(long, default_value = "0")]
        recycle_after: usize,

        /// Redraw walk counters on stderr instead of logging them
        #[arg(long)]
        live: bool,

        /// Run even if another update of the repository is in progress
        #[arg(long)]
        force: bool,
    },

    /// Shows one indexed commit
    Show {
        /// Full commit SHA
        commit: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        repo_name: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lists update sessions of a repository
    Sessions {
        #[arg(long)]
        project: String,

        #[arg(long)]
        repo_name: String,

        /// Remove scheduled and in-progress sessions left by a killed run
        #[arg(long)]
        clear: bool,
    },

    /// Show database statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logger
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level)
    ).init();

    // Open database
    let db = GitSearchDb::open(&cli.database)
        .with_context(|| format!("Failed to open database at {:?}", cli.database))?;

    match cli.command {
        Commands::Index { repo, remote, project, repo_name, boundary, recycle_after, live, force } => {
            let options = IndexOptions {
                repo,
                remote,
                project,
                repo_name,
                boundary,
                recycle_after,
                live,
                force,
            };
            cmd_index(options, db)?;
        }
        Commands::Show { commit, project, repo_name, json } => {
            cmd_show(commit, project, repo_name, json, db)?;
        }
        Commands::Sessions { project, repo_name, clear } => {
            cmd_sessions(project, repo_name, clear, db)?;
        }
        Commands::Stats => {
            cmd_stats(db)?;
        }
    }

    Ok(())
}
