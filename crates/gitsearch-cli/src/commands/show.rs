//! Show command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use gitsearch_core::CommitRecord;
use gitsearch_db::GitSearchDb;
use gitsearch_index::short_id;

use crate::output::format_record_date;

/// Prints one indexed commit
pub fn cmd_show(
    commit: String,
    project: String,
    repo_name: String,
    json: bool,
    db: GitSearchDb,
) -> Result<()> {
    let Some(record) = db.get(&commit, &project, &repo_name)? else {
        eprintln!(
            "{} Commit {} not indexed for {}/{}",
            "❌".red(),
            commit.bold(),
            project,
            repo_name
        );
        std::process::exit(1);
    };

    if json {
        let text = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
        println!("{}", text);
    } else {
        print_record(&record);
    }
    Ok(())
}

fn print_record(record: &CommitRecord) {
    println!("\n{} {}", "📝 Commit:".bright_cyan(), record.commit_id.bold());
    println!("{}", "━".repeat(60).bright_black());
    println!(
        "  {}  {}/{} ({})",
        "Repository:".bright_yellow(),
        record.project,
        record.repo,
        record.origin
    );
    println!(
        "  {}      {} <{}>",
        "Author:".bright_yellow(),
        record.author_name,
        record.author_email
    );
    println!("  {}        {}", "Date:".bright_yellow(), format_record_date(&record.date));

    if !record.pr.is_empty() {
        println!("  {}          #{}", "PR:".bright_yellow(), record.pr.bold());
    }
    if !record.merge_via.is_empty() {
        let chain: Vec<&str> = record.merge_via.iter().map(|id| short_id(id)).collect();
        println!("  {}  {}", "Merged via:".bright_yellow(), chain.join(" → "));
    }

    println!("\n{}", "📄 Files:".bright_cyan());
    println!("{}", "━".repeat(60).bright_black());
    if record.files.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for file in &record.files {
        println!("  {}", file);
    }

    println!("\n{}", "💬 Message:".bright_cyan());
    println!("{}", "━".repeat(60).bright_black());
    for line in &record.description {
        println!("  {}", line.bright_white());
    }
}
