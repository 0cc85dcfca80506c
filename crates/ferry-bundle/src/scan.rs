//! Drop-folder scanning: summarize every bundle in a directory without extracting it.
//!
//! [`scan_removable_media`] does the same for every mounted removable volume,
//! which is how bundles usually arrive on the consumer side.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use tracing::{debug, warn};

use crate::archive::read_manifest_from_archive;
use crate::error::{BundleError, BundleResult};

/// Summary of one bundle found on disk.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BundleInfo {
    pub path: PathBuf,
    pub repo_name: String,
    /// Archive size in bytes.
    pub size: u64,
    pub created_at: Option<String>,
    pub has_submodules: bool,
    pub has_artifacts: bool,
}

/// List `*.tar.gz` archives in `dir`, newest first.
///
/// Archives whose manifest cannot be read are skipped with a warning.
/// A missing directory yields an empty list.
pub fn scan_bundles(dir: &Path) -> BundleResult<Vec<BundleInfo>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut found: Vec<(SystemTime, BundleInfo)> = Vec::new();
    for path in list_archives(dir)? {
        let meta = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(archive = %path.display(), error = %e, "skipping unreadable bundle");
                continue;
            }
        };
        let manifest = match read_manifest_from_archive(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(archive = %path.display(), error = %e, "skipping invalid bundle");
                continue;
            }
        };
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((
            modified,
            BundleInfo {
                path,
                repo_name: manifest.repo_name,
                size: meta.len(),
                created_at: Some(manifest.created_at).filter(|c| !c.is_empty()),
                has_submodules: !manifest.submodules.is_empty(),
                has_artifacts: !manifest.artifacts.is_empty(),
            },
        ));
    }

    found.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(found.into_iter().map(|(_, info)| info).collect())
}

/// `*.tar.gz` files directly inside `dir`, sorted by file name.
pub fn list_archives(dir: &Path) -> BundleResult<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| BundleError::io(dir, e))? {
        let entry = entry.map_err(|e| BundleError::io(dir, e))?;
        let path = entry.path();
        let is_archive = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".tar.gz"));
        if is_archive && path.is_file() {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

/// Volumes that are never removable media.
const SYSTEM_VOLUMES: &[&str] = &["Macintosh HD"];

/// Directories under which removable media get mounted on this platform.
///
/// Linux: `/media/<user>`, `/run/media/<user>` and `/mnt`. macOS: `/Volumes`.
/// Windows: drive letters `D:` to `Z:`, which are volumes themselves.
pub fn removable_media_roots() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        return vec![PathBuf::from("/Volumes")];
    }
    if cfg!(windows) {
        return Vec::new();
    }
    let mut roots = Vec::new();
    if let Some(user) = dirs::home_dir().and_then(|h| h.file_name().map(|n| n.to_owned())) {
        roots.push(Path::new("/media").join(&user));
        roots.push(Path::new("/run/media").join(&user));
    }
    roots.push(PathBuf::from("/mnt"));
    roots
}

/// Mounted volumes: every directory directly below one of `roots`.
///
/// Missing or unreadable roots are skipped.
pub fn mount_points(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut mounts = Vec::new();
    for root in roots {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir() && !is_system_volume(p))
            .collect();
        found.sort();
        mounts.extend(found);
    }
    mounts
}

fn is_system_volume(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| SYSTEM_VOLUMES.contains(&n))
}

/// Drive letters `D:` to `Z:` that exist.
fn windows_drives() -> Vec<PathBuf> {
    ('D'..='Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter)))
        .filter(|p| p.is_dir())
        .collect()
}

/// Scan every volume found below `roots`, newest bundle first per volume.
///
/// A volume that cannot be listed is skipped with a warning.
pub fn scan_mounts(roots: &[PathBuf]) -> Vec<BundleInfo> {
    let mut volumes = mount_points(roots);
    if cfg!(windows) {
        volumes.extend(windows_drives());
    }

    let mut bundles = Vec::new();
    for volume in volumes {
        match scan_bundles(&volume) {
            Ok(found) => {
                debug!(volume = %volume.display(), bundles = found.len(), "scanned volume");
                bundles.extend(found);
            }
            Err(e) => warn!(volume = %volume.display(), error = %e, "skipping unreadable volume"),
        }
    }
    bundles
}

/// Bundles on any mounted removable volume.
pub fn scan_removable_media() -> Vec<BundleInfo> {
    scan_mounts(&removable_media_roots())
}
