//! Configuration directory layout.
//!
//! ```text
//! <config_dir>/
//!   profiles.json
//!   mappings/<profile>.json
//!   backups/
//!   history.json
//!   s3_settings.json
//!   mapping-dict.json
//! ```

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Environment variable overriding the default configuration directory.
pub const CONFIG_DIR_ENV: &str = "FERRY_CONFIG_DIR";

/// Resolved configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Explicit path, else `FERRY_CONFIG_DIR`, else `~/.ferry`.
    pub fn resolve(explicit: Option<&Path>) -> StoreResult<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }
        if let Some(env) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(env));
        }
        let home = dirs::home_dir().ok_or_else(|| StoreError::NoConfigDir {
            message: "home directory unknown; pass --config-dir or set FERRY_CONFIG_DIR".into(),
        })?;
        Ok(Self::new(home.join(".ferry")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.root.join("profiles.json")
    }

    pub fn mappings_dir(&self) -> PathBuf {
        self.root.join("mappings")
    }

    pub fn mapping_file(&self, profile: &str) -> PathBuf {
        self.mappings_dir().join(format!("{}.json", profile))
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join("history.json")
    }

    pub fn s3_settings_file(&self) -> PathBuf {
        self.root.join("s3_settings.json")
    }

    pub fn mapping_dict_file(&self) -> PathBuf {
        self.root.join("mapping-dict.json")
    }
}
