//! Error types for the configuration directory.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or mutating the configuration directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Profile already exists (create/import).
    #[error("profile '{name}' already exists")]
    ProfileExists { name: String },

    /// Profile not found.
    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    /// The `default` profile cannot be deleted.
    #[error("cannot delete the '{name}' profile")]
    ProtectedProfile { name: String },

    /// Profile names double as file names.
    #[error("invalid profile name '{name}': {reason}")]
    InvalidProfileName { name: String, reason: String },

    /// Import payload is missing required data.
    #[error("invalid import data: {reason}")]
    InvalidImport { reason: String },

    /// A JSON or YAML file could not be parsed.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// A stored document does not have the expected shape.
    #[error("invalid content in {}: {reason}", path.display())]
    InvalidContent { path: PathBuf, reason: String },

    /// Serialization failed.
    #[error("failed to serialize {what}: {reason}")]
    Serialize { what: String, reason: String },

    /// No usable configuration directory could be determined.
    #[error("could not determine configuration directory: {message}")]
    NoConfigDir { message: String },

    /// A capability was requested that has not been set up.
    #[error("{capability} not configured: {message}")]
    NotConfigured {
        capability: &'static str,
        message: String,
    },

    /// Remote object missing.
    #[error("object not found: {key}")]
    ObjectNotFound { key: String },

    /// Remote object storage failure.
    #[error("object store error: {message}")]
    ObjectStore { message: String },

    /// Filesystem error.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the named profile does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound { .. } | Self::ObjectNotFound { .. }
        )
    }

    /// Returns true for errors caused by operator input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ProfileExists { .. }
                | Self::ProfileNotFound { .. }
                | Self::ProtectedProfile { .. }
                | Self::InvalidProfileName { .. }
                | Self::InvalidImport { .. }
                | Self::NotConfigured { .. }
        )
    }

    /// Suggested exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        if self.is_validation() {
            2
        } else {
            1
        }
    }

    pub(crate) fn from_object_store(err: object_store::Error, key: &str) -> Self {
        match err {
            object_store::Error::NotFound { .. } => Self::ObjectNotFound {
                key: key.to_string(),
            },
            other => Self::ObjectStore {
                message: other.to_string(),
            },
        }
    }
}
