//! Error types for the GitLab client.

use std::path::PathBuf;

/// GitLab client errors.
#[derive(Debug, thiserror::Error)]
pub enum GitLabError {
    /// Base URL or credentials unusable.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Project path does not resolve (404 on the project endpoint).
    #[error("project not found: {path}")]
    ProjectNotFound { path: String },

    /// Any other 404.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// 401/403.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Unexpected HTTP status.
    #[error("GitLab returned HTTP {status} for {resource}")]
    Status { status: u16, resource: String },

    /// Transport failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Body could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Writing a downloaded file failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GitLabError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            _ => 1,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProjectNotFound { .. } | Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for GitLabError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors carry the request URL, which may hold userinfo.
        Self::Network {
            message: err.without_url().to_string(),
        }
    }
}

/// Result type for GitLab operations.
pub type GitLabResult<T> = Result<T, GitLabError>;
