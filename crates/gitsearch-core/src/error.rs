//! Error types for gitsearch-core

/// Errors specific to gitsearch-core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid remote URL: {0}")]
    InvalidRemote(String),

    #[error("Invalid project or repository name: {0:?}")]
    InvalidName(String),

    #[error("Invalid commit record: {0}")]
    InvalidRecord(String),
}
