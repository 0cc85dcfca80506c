//! Air-gap bundle format.
//!
//! A bundle is a single tar.gz whose root holds exactly one directory named
//! after the repository:
//!
//! ```text
//! <repo_name>/
//!   <repo_name>.git/            bare mirror clone
//!   manifest.json               bundle descriptor (see [`Manifest`])
//!   submodules/<name>.git/      optional submodule mirrors
//!   artifacts/<job>/artifacts.zip   optional CI artifacts
//! ```
//!
//! The manifest is the only contract shared between the producer (`pack`) and
//! the consumer (`ingest`); consumers must tolerate missing optional fields.

pub mod archive;
pub mod error;
pub mod manifest;
pub mod naming;
pub mod scan;

pub use archive::{extract_archive, load_manifest, paths, read_manifest_from_archive, write_archive};
pub use error::{BundleError, BundleResult};
pub use manifest::{ArtifactEntry, Manifest, SubmoduleEntry};
pub use naming::{
    archive_file_name, created_at_now, derive_repo_name, is_valid_repo_name, redact_credentials,
    sanitize_repo_name, CREATED_AT_FORMAT,
};
pub use scan::{
    list_archives, mount_points, removable_media_roots, scan_bundles, scan_mounts,
    scan_removable_media, BundleInfo,
};
