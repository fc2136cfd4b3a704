//! Sessions command implementation

use anyhow::Result;
use colored::Colorize;
use gitsearch_db::GitSearchDb;
use tabled::{Table, settings::{Style, Color, Modify, object::Rows}};

use crate::output::SessionRow;

/// Lists update sessions of one repository, newest first
pub fn cmd_sessions(project: String, repo_name: String, clear: bool, db: GitSearchDb) -> Result<()> {
    if clear {
        let removed = db.clear_unfinished(&repo_name, &project)?;
        db.flush()?;
        println!("{} Removed {} unfinished session{}", "🧹".yellow(), removed, if removed == 1 { "" } else { "s" });
    }

    let mut sessions = db.sessions_for_repo(&repo_name, &project)?;

    if sessions.is_empty() {
        println!("{} No sessions recorded for {}/{}", "❌".red(), project, repo_name.bold());
        return Ok(());
    }

    sessions.reverse();
    let rows: Vec<SessionRow> = sessions.iter().map(SessionRow::from).collect();

    println!(
        "\n{} {}",
        "🔄 Update sessions of".bright_cyan(),
        format!("{}/{}", project, repo_name).bold()
    );
    let mut table = Table::new(rows);
    table.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);
    Ok(())
}
