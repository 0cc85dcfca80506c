//! Bundle builder and ingestor.
//!
//! [`pack::Builder`] turns a source repository into a bundle archive;
//! [`ingest::Ingestor`] replays a bundle into the internal forge. Both reach
//! git only through [`git::GitRunner`] and never share state beyond the
//! manifest format in `ferry-bundle`.

pub mod artifacts;
pub mod error;
pub mod git;
pub mod gitmodules;
pub mod ingest;
pub mod mapping;
pub mod pack;

#[cfg(test)]
mod testing;

pub use artifacts::{ArtifactHarvest, ArtifactSource, GitLabArtifacts};
pub use error::{
    is_protected_branch_rejection, IngestError, IngestResult, PackError, PackResult,
    EXIT_CORRUPT_BUNDLE, EXIT_PROTECTED_BRANCH, EXIT_USAGE,
};
pub use git::{GitError, GitOptions, GitResult, GitRunner, SystemGit};
pub use gitmodules::{parse_gitmodules, read_gitmodules, Gitmodule};
pub use ingest::{
    copy_artifacts, ArtifactCopy, BatchItem, BatchReport, Credentials, IngestOutcome,
    IngestRequest, Ingestor, RemoteTemplate, SubmodulePush,
};
pub use mapping::MappingSource;
pub use pack::{Builder, PackOptions, PackOutcome, PackSource};
