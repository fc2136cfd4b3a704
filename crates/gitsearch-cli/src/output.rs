//! Output formatting structures for CLI display

use chrono::{DateTime, NaiveDateTime, Utc};
use gitsearch_core::UpdateSession;
use tabled::Tabled;

/// Table row for displaying update sessions
#[derive(Tabled)]
pub struct SessionRow {
    #[tabled(rename = "Session")]
    pub id: u64,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Started")]
    pub started: String,
    #[tabled(rename = "Finished")]
    pub finished: String,
    #[tabled(rename = "Written")]
    pub written: String,
}

impl From<&UpdateSession> for SessionRow {
    fn from(session: &UpdateSession) -> Self {
        let state = if session.is_finished() {
            "finished"
        } else if session.is_in_progress() {
            "running"
        } else {
            "scheduled"
        };

        Self {
            id: session.id,
            state: state.to_string(),
            started: format_session_time(session.started),
            finished: format_session_time(session.finished),
            written: session
                .commits_written
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn format_session_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Renders a stored `yyyyMMddTHHmmss...Z` date for people; unknown
/// layouts are shown as stored
pub fn format_record_date(date: &str) -> String {
    date.get(..15)
        .and_then(|head| NaiveDateTime::parse_from_str(head, "%Y%m%dT%H%M%S").ok())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| date.to_string())
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
