//! Update sessions around walker runs

use anyhow::Result;
use chrono::Utc;
use gitsearch_core::RepoIdentity;
use gitsearch_db::GitSearchDb;

/// What `run_update` ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Another run holds the repository; a follow-up session was scheduled
    Deferred { scheduled: u64 },

    /// One or more sessions ran to completion
    Completed { sessions: usize, written: usize },
}

/// Runs `walk` inside update sessions for the repository.
///
/// If another session is in progress (and `force` is off) nothing is walked;
/// a scheduled session is left behind instead so the running one walks again
/// when it is done. Otherwise the scheduled session is resumed (or a new one
/// begun), `walk` runs, and the loop repeats while sessions keep getting
/// scheduled.
pub fn run_update<F>(
    db: &GitSearchDb,
    identity: &RepoIdentity,
    force: bool,
    mut walk: F,
) -> Result<UpdateOutcome>
where
    F: FnMut() -> Result<usize>,
{
    let repo = identity.repo.as_str();
    let project = identity.project.as_str();
    let mut sessions = 0;
    let mut written = 0;

    loop {
        let scheduled = db.scheduled_update(repo, project)?;

        if db.update_in_progress(repo, project)? {
            if !force {
                let id = match scheduled {
                    Some(session) => session.id,
                    None => {
                        let id = db.next_session_id()?;
                        db.schedule_update(id, repo, project)?;
                        id
                    }
                };
                db.flush()?;
                log::info!(
                    "Update of {} already in progress, scheduled session {}",
                    identity,
                    id
                );
                return Ok(UpdateOutcome::Deferred { scheduled: id });
            }
            log::warn!("Ignoring in-progress update of {}", identity);
        }

        let session = match scheduled {
            Some(session) => db.resume_session(session.id, Utc::now())?,
            None => {
                let id = db.next_session_id()?;
                db.begin_session(id, repo, project, Utc::now())?
            }
        };
        db.flush()?;
        log::info!("Session {} started for {}", session.id, identity);

        let count = match walk() {
            Ok(count) => count,
            Err(e) => {
                // Close the session so the next run is not locked out. The
                // walk's error is the one reported even if closing fails.
                if let Err(close_err) = db
                    .end_session(session.id, Utc::now(), 0)
                    .and_then(|_| db.flush())
                {
                    log::error!("Failed to close session {}: {:#}", session.id, close_err);
                }
                log::error!("Session {} for {} failed", session.id, identity);
                return Err(e);
            }
        };

        db.end_session(session.id, Utc::now(), count as u64)?;
        db.flush()?;
        log::info!("Session {} finished, {} commits written", session.id, count);

        sessions += 1;
        written += count;

        if db.scheduled_update(repo, project)?.is_none() {
            break;
        }
    }

    Ok(UpdateOutcome::Completed { sessions, written })
}
