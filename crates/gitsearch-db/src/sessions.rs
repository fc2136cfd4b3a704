//! Update session bookkeeping
//!
//! Every indexing run is recorded as a session so that a second run for the
//! same repository can tell whether one is already in flight and, if so,
//! leave a scheduled session behind for the running one to pick up.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gitsearch_core::UpdateSession;
use serde::{Deserialize, Serialize};

use crate::database::GitSearchDb;

#[derive(Serialize, Deserialize)]
struct StoredSession {
    repo: String,
    project: String,
    /// Unix milliseconds
    started: Option<i64>,
    finished: Option<i64>,
    commits_written: Option<u64>,
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(DateTime::<Utc>::from_timestamp_millis)
}

fn unpack_session(key: &[u8], bytes: &[u8]) -> Result<UpdateSession> {
    let id_bytes: [u8; 8] = key
        .try_into()
        .context("Session key is not a u64")?;
    let stored: StoredSession =
        bincode::deserialize(bytes).context("Failed to deserialize UpdateSession")?;
    Ok(into_session(u64::from_be_bytes(id_bytes), stored))
}

fn into_session(id: u64, stored: StoredSession) -> UpdateSession {
    UpdateSession {
        id,
        repo: stored.repo,
        project: stored.project,
        started: from_millis(stored.started),
        finished: from_millis(stored.finished),
        commits_written: stored.commits_written,
    }
}

impl GitSearchDb {
    /// Allocates a fresh, monotonically increasing session id
    pub fn next_session_id(&self) -> Result<u64> {
        self.db.generate_id().context("Failed to generate session id")
    }

    /// Records the start of a new session
    pub fn begin_session(
        &self,
        id: u64,
        repo: &str,
        project: &str,
        started: DateTime<Utc>,
    ) -> Result<UpdateSession> {
        let stored = StoredSession {
            repo: repo.to_string(),
            project: project.to_string(),
            started: Some(to_millis(started)),
            finished: None,
            commits_written: None,
        };
        self.put_session(id, &stored)?;
        log::debug!("Began session {} for {}/{}", id, project, repo);
        self.get_session(id)?
            .context("Session vanished right after insert")
    }

    /// Marks a scheduled session as started
    pub fn resume_session(&self, id: u64, started: DateTime<Utc>) -> Result<UpdateSession> {
        self.update_session(id, |stored| stored.started = Some(to_millis(started)))
    }

    /// Marks a session as finished with the number of commits it wrote
    pub fn end_session(
        &self,
        id: u64,
        finished: DateTime<Utc>,
        commits_written: u64,
    ) -> Result<UpdateSession> {
        self.update_session(id, |stored| {
            stored.finished = Some(to_millis(finished));
            stored.commits_written = Some(commits_written);
        })
    }

    /// Leaves a not-yet-started session for a later run to pick up
    pub fn schedule_update(&self, id: u64, repo: &str, project: &str) -> Result<UpdateSession> {
        let stored = StoredSession {
            repo: repo.to_string(),
            project: project.to_string(),
            started: None,
            finished: None,
            commits_written: None,
        };
        self.put_session(id, &stored)?;
        log::debug!("Scheduled session {} for {}/{}", id, project, repo);
        self.get_session(id)?
            .context("Session vanished right after insert")
    }

    pub fn get_session(&self, id: u64) -> Result<Option<UpdateSession>> {
        let key = id.to_be_bytes();
        match self.sessions.get(key)? {
            Some(bytes) => Ok(Some(unpack_session(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Oldest scheduled (not yet started) session for the repository
    pub fn scheduled_update(&self, repo: &str, project: &str) -> Result<Option<UpdateSession>> {
        Ok(self
            .sessions_for_repo(repo, project)?
            .into_iter()
            .find(UpdateSession::is_scheduled))
    }

    /// True if a session for the repository has started but not finished
    pub fn update_in_progress(&self, repo: &str, project: &str) -> Result<bool> {
        Ok(self
            .sessions_for_repo(repo, project)?
            .iter()
            .any(UpdateSession::is_in_progress))
    }

    /// All sessions of one repository in id order
    pub fn sessions_for_repo(&self, repo: &str, project: &str) -> Result<Vec<UpdateSession>> {
        let mut results = Vec::new();
        for item in self.sessions.iter() {
            let (key, value) = item.context("Failed to read from database")?;
            let session = unpack_session(&key, &value)?;
            if session.repo == repo && session.project == project {
                results.push(session);
            }
        }
        Ok(results)
    }

    /// Start time of the most recently finished session across all repositories
    pub fn most_recent_finished(&self) -> Result<Option<DateTime<Utc>>> {
        let mut latest: Option<UpdateSession> = None;
        for item in self.sessions.iter() {
            let (key, value) = item.context("Failed to read from database")?;
            let session = unpack_session(&key, &value)?;
            if !session.is_finished() {
                continue;
            }
            if latest.as_ref().map_or(true, |l| session.finished > l.finished) {
                latest = Some(session);
            }
        }
        Ok(latest.and_then(|s| s.started))
    }

    /// Drops the scheduled and in-progress sessions of a repository, e.g.
    /// after a run was killed before it could close its session.
    /// Returns how many were removed.
    pub fn clear_unfinished(&self, repo: &str, project: &str) -> Result<usize> {
        let mut removed = 0;
        for session in self.sessions_for_repo(repo, project)? {
            if session.is_finished() {
                continue;
            }
            self.sessions
                .remove(session.id.to_be_bytes())
                .context("Failed to remove session")?;
            log::debug!("Removed unfinished session {} of {}/{}", session.id, project, repo);
            removed += 1;
        }
        Ok(removed)
    }

    /// Returns the number of recorded sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn put_session(&self, id: u64, stored: &StoredSession) -> Result<()> {
        let bytes = bincode::serialize(stored).context("Failed to serialize UpdateSession")?;
        self.sessions
            .insert(id.to_be_bytes(), bytes)
            .context("Failed to store session")?;
        Ok(())
    }

    fn update_session<F>(&self, id: u64, apply: F) -> Result<UpdateSession>
    where
        F: FnOnce(&mut StoredSession),
    {
        let key = id.to_be_bytes();
        let bytes = self
            .sessions
            .get(key)?
            .with_context(|| format!("Unknown session {}", id))?;
        let mut stored: StoredSession =
            bincode::deserialize(&bytes).context("Failed to deserialize UpdateSession")?;
        apply(&mut stored);
        self.put_session(id, &stored)?;
        Ok(into_session(id, stored))
    }
}
