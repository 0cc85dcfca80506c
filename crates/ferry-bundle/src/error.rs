//! Error types for bundle encoding, staging and extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Errors that can occur while building, reading or validating a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A repository name could not be derived or does not match `^[A-Za-z0-9._-]+$`.
    #[error("invalid repository name '{name}': {reason}")]
    InvalidRepoName { name: String, reason: String },

    /// `manifest.json` is not valid JSON.
    #[error("manifest is not valid JSON: {0}")]
    ManifestJson(#[from] serde_json::Error),

    /// A field without any fallback is absent from the manifest.
    #[error("manifest is missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The manifest decoded but violates a structural invariant.
    #[error("invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    /// The archive does not have the expected layout.
    #[error("corrupt bundle {}: {reason}", archive.display())]
    Corrupt { archive: PathBuf, reason: String },

    /// Filesystem error while staging or extracting.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BundleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(archive: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            archive: archive.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that mean the bundle content itself is unusable
    /// (as opposed to a local filesystem problem).
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::Corrupt { .. }
                | Self::ManifestJson(_)
                | Self::MissingField { .. }
                | Self::InvalidManifest { .. }
        )
    }

    /// True for input validation errors raised before any work starts.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRepoName { .. })
    }
}
