//! Minimal GitLab REST v4 client.
//!
//! Covers what the bundle builder needs from a private GitLab: authenticated
//! clone URLs, project lookup, the latest successful pipeline for a ref, the
//! jobs of that pipeline that produced artifacts, and artifact downloads.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::GitLabClient;
pub use config::GitLabConfig;
pub use error::{GitLabError, GitLabResult};
pub use types::{Job, JobArtifactFile, Pipeline, Project};
