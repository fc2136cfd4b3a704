//! Live walk counters on stderr

use colored::Colorize;
use gitsearch_index::{format_number, Statistics, StatisticsDisplay};
use std::io::Write;
use std::time::{Duration, Instant};

const REDRAW_EVERY: Duration = Duration::from_millis(200);

/// Redraws one status line in place, at most every `REDRAW_EVERY`
#[derive(Default)]
pub struct LiveDisplay {
    last_draw: Option<Instant>,
}

impl LiveDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatisticsDisplay for LiveDisplay {
    fn update(&mut self, stats: &dyn Statistics) {
        let now = Instant::now();
        if self
            .last_draw
            .is_some_and(|last| now.duration_since(last) < REDRAW_EVERY)
        {
            return;
        }
        self.last_draw = Some(now);

        let mut stderr = std::io::stderr().lock();
        // A failed redraw only loses a status line
        let _ = write!(
            stderr,
            "\r{} {}  {} {}  {} {}  {} {}",
            "Unique:".bright_yellow(),
            format_number(stats.visited()).bold(),
            "Visited:".bright_yellow(),
            format_number(stats.processed()).bold(),
            "Queued:".bright_yellow(),
            format_number(stats.to_visit()).bold(),
            "Written:".bright_yellow(),
            format_number(stats.written()).bold()
        );
        let _ = stderr.flush();
    }
}

impl Drop for LiveDisplay {
    fn drop(&mut self) {
        if self.last_draw.is_some() {
            eprintln!();
        }
    }
}
