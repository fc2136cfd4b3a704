//! Stats command implementation

use anyhow::Result;
use colored::Colorize;
use gitsearch_db::GitSearchDb;
use gitsearch_index::format_number;

use crate::output::{format_bytes, format_session_time};

/// Displays database statistics
pub fn cmd_stats(db: GitSearchDb) -> Result<()> {
    let last_update = db
        .most_recent_finished()?
        .map(|at| format_session_time(Some(at)))
        .unwrap_or_else(|| "never".to_string());

    println!("{}", "Database Statistics:".bright_cyan().bold());
    println!("  {}: {}", "Commits".bright_yellow(), format_number(db.commit_count()).bold());
    println!("  {}: {}", "Update sessions".bright_yellow(), format_number(db.session_count()).bold());
    println!("  {}: {}", "Last finished update".bright_yellow(), last_update.bold());
    println!("  {}: {}", "Size on disk".bright_yellow(), format_bytes(db.db_size_bytes()).bold());
    Ok(())
}
