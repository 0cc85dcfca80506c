//! Archive staging and extraction.
//!
//! Staging writes `<root>/...` into a temp file next to the destination and
//! renames it into place only once the gzip stream is finished, so a failed
//! pack never leaves a partial `.tar.gz` in the output directory.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use tar::{Archive, Builder, HeaderMode};
use tracing::debug;

use crate::error::{BundleError, BundleResult};
use crate::manifest::Manifest;

/// Canonical paths inside the bundle root.
pub mod paths {
    use std::path::{Path, PathBuf};

    /// Manifest at bundle root.
    pub const MANIFEST: &str = "manifest.json";
    /// Submodule mirrors.
    pub const SUBMODULES_DIR: &str = "submodules";
    /// CI artifacts, one directory per job.
    pub const ARTIFACTS_DIR: &str = "artifacts";
    /// File name of a job's artifact archive.
    pub const ARTIFACT_FILE: &str = "artifacts.zip";

    /// `<root>/<repo_name>.git`
    pub fn mirror_dir(root: &Path, repo_name: &str) -> PathBuf {
        root.join(format!("{}.git", repo_name))
    }
}

/// Archive `bundle_root` (directory name becomes the single archive root) to `out_path`.
pub fn write_archive(bundle_root: &Path, out_path: &Path) -> BundleResult<()> {
    let root_name = bundle_root
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| BundleError::InvalidRepoName {
            name: bundle_root.display().to_string(),
            reason: "bundle root has no usable directory name".into(),
        })?;

    let parent = out_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;

    let mut staging = tempfile::Builder::new()
        .prefix(".ferry-")
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(|e| BundleError::io(parent, e))?;

    {
        let gz = GzBuilder::new()
            .mtime(0)
            .write(staging.as_file_mut(), Compression::default());
        let mut tar = Builder::new(gz);
        tar.mode(HeaderMode::Deterministic);
        tar.follow_symlinks(false);
        tar.append_dir_all(root_name, bundle_root)
            .map_err(|e| BundleError::io(bundle_root, e))?;
        let gz = tar.into_inner().map_err(|e| BundleError::io(out_path, e))?;
        gz.finish().map_err(|e| BundleError::io(out_path, e))?;
    }

    staging
        .as_file()
        .sync_all()
        .map_err(|e| BundleError::io(out_path, e))?;
    staging
        .persist(out_path)
        .map_err(|e| BundleError::io(out_path, e.error))?;

    debug!(archive = %out_path.display(), "bundle archive staged");
    Ok(())
}

/// Extract `archive` into the empty directory `dest` and return the single root directory.
///
/// Zero or several top-level entries, or a top-level file, is a corrupt bundle.
pub fn extract_archive(archive: &Path, dest: &Path) -> BundleResult<PathBuf> {
    let file = File::open(archive).map_err(|e| BundleError::io(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));
    tar.set_overwrite(true);
    tar.unpack(dest)
        .map_err(|e| BundleError::corrupt(archive, format!("extraction failed: {}", e)))?;

    let mut roots = Vec::new();
    for entry in fs::read_dir(dest).map_err(|e| BundleError::io(dest, e))? {
        let entry = entry.map_err(|e| BundleError::io(dest, e))?;
        roots.push(entry.path());
    }

    match roots.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        [only] => Err(BundleError::corrupt(
            archive,
            format!(
                "top-level entry '{}' is not a directory",
                only.file_name().unwrap_or_default().to_string_lossy()
            ),
        )),
        [] => Err(BundleError::corrupt(archive, "archive is empty")),
        many => Err(BundleError::corrupt(
            archive,
            format!(
                "bundle must contain a single root directory, found {} entries",
                many.len()
            ),
        )),
    }
}

/// Read and decode `<root>/manifest.json` from an extracted bundle.
pub fn load_manifest(root: &Path) -> BundleResult<Manifest> {
    let path = root.join(paths::MANIFEST);
    if !path.is_file() {
        return Err(BundleError::corrupt(root, "missing manifest.json"));
    }
    let bytes = fs::read(&path).map_err(|e| BundleError::io(&path, e))?;
    Manifest::decode(&bytes)
}

/// Decode the manifest straight from the archive stream, without extracting.
pub fn read_manifest_from_archive(archive: &Path) -> BundleResult<Manifest> {
    let file = File::open(archive).map_err(|e| BundleError::io(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(BufReader::new(file)));
    let entries = tar
        .entries()
        .map_err(|e| BundleError::corrupt(archive, e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| BundleError::corrupt(archive, e.to_string()))?;
        let path = entry
            .path()
            .map_err(|e| BundleError::corrupt(archive, e.to_string()))?
            .into_owned();
        if is_root_manifest(&path) {
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| BundleError::corrupt(archive, e.to_string()))?;
            return Manifest::decode(&bytes);
        }
    }

    Err(BundleError::corrupt(archive, "missing manifest.json"))
}

/// `<root>/manifest.json`, tolerating a leading `./`.
fn is_root_manifest(path: &Path) -> bool {
    let parts: Vec<_> = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    matches!(parts.as_slice(), [Component::Normal(_), Component::Normal(name)] if *name == paths::MANIFEST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_manifest_detection() {
        assert!(is_root_manifest(Path::new("app/manifest.json")));
        assert!(is_root_manifest(Path::new("./app/manifest.json")));
        assert!(!is_root_manifest(Path::new("manifest.json")));
        assert!(!is_root_manifest(Path::new("app/submodules/manifest.json")));
    }

    #[test]
    fn mirror_dir_layout() {
        assert_eq!(
            paths::mirror_dir(Path::new("/b/app"), "app"),
            PathBuf::from("/b/app/app.git")
        );
    }
}
