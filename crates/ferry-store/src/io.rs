//! Filesystem helpers: durable JSON writes, JSON/YAML reads, timestamped backups.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Timestamp suffix used for backup file names.
pub const BACKUP_STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Serialization format for exported documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocFormat {
    #[default]
    Json,
    Yaml,
}

impl DocFormat {
    /// Pick the format from a file extension (`.yaml`/`.yml` are YAML, anything else JSON).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    pub fn render<T: Serialize>(self, value: &T) -> StoreResult<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialize {
                what: "document".into(),
                reason: e.to_string(),
            }),
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| StoreError::Serialize {
                what: "document".into(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str, origin: &Path) -> StoreResult<T> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| StoreError::parse(origin, e)),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| StoreError::parse(origin, e)),
        }
    }
}

/// Read a JSON or YAML document, chosen by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    DocFormat::from_path(path).parse(&content, path)
}

/// Read a document if the file exists.
pub fn read_document_opt<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_document(path).map(Some)
}

/// Write pretty JSON through a synced temp file renamed over `path`.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let mut content = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialize {
        what: path.display().to_string(),
        reason: e.to_string(),
    })?;
    content.push(b'\n');

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".ferry-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| StoreError::io(parent, e))?;
    temp.write_all(&content)
        .map_err(|e| StoreError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

/// Copy `path` into `backups_dir` as `<stem>_<UTC stamp><ext>`.
///
/// Returns `None` when there is nothing to back up. Existing backups are never
/// overwritten; a numeric suffix is added when the stamp collides.
pub fn backup_file(path: &Path, backups_dir: &Path) -> StoreResult<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    fs::create_dir_all(backups_dir).map_err(|e| StoreError::io(backups_dir, e))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("backup");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let stamp = chrono::Utc::now().format(BACKUP_STAMP_FORMAT);

    let mut target = backups_dir.join(format!("{}_{}{}", stem, stamp, ext));
    let mut n = 1;
    while target.exists() {
        target = backups_dir.join(format!("{}_{}-{}{}", stem, stamp, n, ext));
        n += 1;
    }

    fs::copy(path, &target).map_err(|e| StoreError::io(&target, e))?;
    tracing::debug!(source = %path.display(), backup = %target.display(), "backup written");
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn atomic_write_replaces_content_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data.json");

        write_json_atomic(&path, &json!({"a": 1})).unwrap();
        write_json_atomic(&path, &json!({"a": 2})).unwrap();

        let value: serde_json::Value = read_document(&path).unwrap();
        assert_eq!(value["a"], 2);
        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("data.json")]);
    }

    #[test]
    fn yaml_is_selected_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.yml");
        fs::write(&path, "app: internal/app\n").unwrap();

        let value: std::collections::BTreeMap<String, String> = read_document(&path).unwrap();
        assert_eq!(value["app"], "internal/app");
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{nope").unwrap();

        let err = read_document::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn backups_never_overwrite_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("default.json");
        let backups = dir.path().join("backups");
        fs::write(&src, "{}").unwrap();

        let first = backup_file(&src, &backups).unwrap().unwrap();
        let second = backup_file(&src, &backups).unwrap().unwrap();
        assert_ne!(first, second);
        assert!(first
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("default_"));
        assert!(first.extension().is_some_and(|e| e == "json"));

        assert!(backup_file(&dir.path().join("absent.json"), &backups)
            .unwrap()
            .is_none());
    }
}
