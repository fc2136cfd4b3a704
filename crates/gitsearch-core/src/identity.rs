//! Repository identity derived from a remote URL

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::models::KEY_SEPARATOR;

/// Hosting system a repository was cloned from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    GitHub,
    Bitbucket,
}

impl Origin {
    /// Guesses the hosting system from a remote URL. Anything that does not
    /// look like a Bitbucket server is assumed to be GitHub.
    pub fn from_remote_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        if lower.contains("bitbucket") || lower.contains("/scm/") {
            Origin::Bitbucket
        } else {
            Origin::GitHub
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::GitHub => "github",
            Origin::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable (project, repo) pair that scopes every stored commit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentity {
    pub project: String,
    pub repo: String,
    pub origin: Origin,
}

impl RepoIdentity {
    pub fn new(project: impl Into<String>, repo: impl Into<String>, origin: Origin) -> Self {
        Self {
            project: project.into(),
            repo: repo.into(),
            origin,
        }
    }

    /// Like `new`, but rejects empty names and names containing
    /// `KEY_SEPARATOR`, which would make storage keys ambiguous
    pub fn try_new(
        project: impl Into<String>,
        repo: impl Into<String>,
        origin: Origin,
    ) -> Result<Self, CoreError> {
        let identity = Self::new(project, repo, origin);
        for part in [&identity.project, &identity.repo] {
            if part.trim().is_empty() || part.contains(KEY_SEPARATOR) {
                return Err(CoreError::InvalidName(part.clone()));
            }
        }
        Ok(identity)
    }

    /// Derives the identity from a remote URL.
    ///
    /// The repo is the last path segment without its `.git` suffix and the
    /// project is the segment before it. Handles `https://host/proj/repo.git`,
    /// `ssh://git@host:7999/proj/repo.git` and `git@host:proj/repo.git`.
    pub fn from_remote_url(url: &str) -> Result<Self, CoreError> {
        let trimmed = url.trim().trim_end_matches('/');
        let mut segments = trimmed
            .rsplit(|c: char| c == '/' || c == ':')
            .filter(|s| !s.is_empty());

        let repo = segments
            .next()
            .map(|s| s.strip_suffix(".git").unwrap_or(s))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::InvalidRemote(url.to_string()))?;
        let project = segments
            .next()
            .ok_or_else(|| CoreError::InvalidRemote(url.to_string()))?;

        // scp-style "git@host:repo.git" leaves the login as the project
        if project.contains('@') {
            return Err(CoreError::InvalidRemote(url.to_string()));
        }

        Self::try_new(project, repo, Origin::from_remote_url(url))
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.repo)
    }
}
