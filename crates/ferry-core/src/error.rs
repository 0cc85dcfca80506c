//! Error types for building and ingesting bundles.
//!
//! Both enums expose `exit_code()` so the CLI can map failures without
//! inspecting variants itself.

use std::path::PathBuf;

use ferry_bundle::BundleError;
use ferry_gitlab::GitLabError;
use ferry_store::StoreError;
use thiserror::Error;

use crate::git::GitError;

/// Exit code for invalid input or configuration.
pub const EXIT_USAGE: i32 = 2;
/// Exit code for a push rejected by branch protection.
pub const EXIT_PROTECTED_BRANCH: i32 = 3;
/// Exit code for an unreadable or structurally invalid bundle.
pub const EXIT_CORRUPT_BUNDLE: i32 = 4;

pub type PackResult<T> = Result<T, PackError>;
pub type IngestResult<T> = Result<T, IngestError>;

/// Failure while producing a bundle.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("invalid source: {message}")]
    InvalidSource { message: String },

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("{context}: {source}")]
    Git {
        context: String,
        #[source]
        source: GitError,
    },

    #[error(transparent)]
    GitLab(#[from] GitLabError),

    #[error("no successful pipeline found for project '{repo_path}'")]
    NoSuccessfulPipeline { repo_path: String },

    #[error("invalid .gitmodules: {message}")]
    Gitmodules { message: String },

    #[error("submodules '{first}' and '{second}' both map to mirror '{mirror}'")]
    SubmoduleCollision {
        first: String,
        second: String,
        mirror: String,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    pub(crate) fn git(context: impl Into<String>, source: GitError) -> Self {
        Self::Git {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        match self {
            Self::Config { .. } | Self::InvalidSource { .. } => true,
            Self::Bundle(e) => e.is_validation(),
            Self::GitLab(e) => e.exit_code() == EXIT_USAGE,
            _ => false,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_validation() {
            EXIT_USAGE
        } else {
            1
        }
    }
}

/// Failure while pushing a bundle into the target forge.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error("corrupt bundle: mirror directory {} is missing", path.display())]
    MissingMirror { path: PathBuf },

    #[error("push to {remote} rejected by branch protection: {stderr}")]
    ProtectedBranch { remote: String, stderr: String },

    #[error("failed to push '{repo}': {source}")]
    Push {
        repo: String,
        #[source]
        source: GitError,
    },

    #[error("invalid remote template '{template}': {reason}")]
    Template { template: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_corrupt_bundle(&self) -> bool {
        match self {
            Self::MissingMirror { .. } => true,
            Self::Bundle(e) => e.is_corrupt(),
            _ => false,
        }
    }

    pub fn is_protected_branch(&self) -> bool {
        matches!(self, Self::ProtectedBranch { .. })
    }

    /// Operator guidance for failures that have a known fix.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::ProtectedBranch { .. } => Some(
                "Mirror pushes rewrite every ref. In the target project open \
                 Settings > Repository > Protected branches, allow force push for \
                 the affected branches (or unprotect them) and run ingest again.",
            ),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_protected_branch() {
            EXIT_PROTECTED_BRANCH
        } else if self.is_corrupt_bundle() {
            EXIT_CORRUPT_BUNDLE
        } else if matches!(self, Self::Template { .. })
            || matches!(self, Self::Store(e) if e.is_validation())
        {
            EXIT_USAGE
        } else {
            1
        }
    }
}

/// True when git stderr shows a server-side branch protection rejection.
pub fn is_protected_branch_rejection(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("protected branch") || lower.contains("pre-receive hook declined")
}
