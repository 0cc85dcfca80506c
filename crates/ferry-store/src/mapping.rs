//! Profile-scoped mapping store.
//!
//! Each profile owns `mappings/<profile>.json`:
//!
//! ```json
//! {
//!   "profile": "default",
//!   "mappings": {
//!     "app": { "internal_name": "internal/app", "added_at": "...", "notes": null }
//!   }
//! }
//! ```
//!
//! Every mutation of a mapping or profile file is preceded by a timestamped
//! copy into `backups/`. Backups are never pruned.

use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::io::{backup_file, read_document, read_document_opt, write_json_atomic};
use crate::paths::ConfigDir;
use crate::profile::{
    now_rfc3339, validate_profile_name, Profile, ProfileUpdate, ProfilesDoc, DEFAULT_PROFILE,
};

/// Key substrings removed from exported documents.
pub const SENSITIVE_KEY_PARTS: &[&str] = &["password", "token", "secret", "credential", "api_key"];

/// One external → internal rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingEntry {
    pub internal_name: String,
    #[serde(default)]
    pub added_at: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MappingDoc {
    profile: String,
    #[serde(default)]
    mappings: BTreeMap<String, MappingEntry>,
}

impl MappingDoc {
    fn empty(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            mappings: BTreeMap::new(),
        }
    }
}

/// Profiles and their mappings inside one configuration directory.
///
/// No locking: concurrent writers against the same directory can race.
#[derive(Debug, Clone)]
pub struct MappingStore {
    dir: ConfigDir,
}

impl MappingStore {
    /// Open the store, creating the layout and the `default` profile on first use.
    pub fn open(dir: ConfigDir) -> StoreResult<Self> {
        for sub in [dir.root().to_path_buf(), dir.mappings_dir(), dir.backups_dir()] {
            fs::create_dir_all(&sub).map_err(|e| StoreError::io(&sub, e))?;
        }

        let store = Self { dir };
        let profiles_file = store.dir.profiles_file();
        if !profiles_file.exists() {
            info!(path = %profiles_file.display(), "initializing configuration directory");
            write_json_atomic(&profiles_file, &ProfilesDoc::bootstrap())?;
            store.save_mappings(&MappingDoc::empty(DEFAULT_PROFILE))?;
        }
        Ok(store)
    }

    pub fn config_dir(&self) -> &ConfigDir {
        &self.dir
    }

    fn load_profiles(&self) -> StoreResult<ProfilesDoc> {
        Ok(read_document_opt(&self.dir.profiles_file())?.unwrap_or_else(ProfilesDoc::bootstrap))
    }

    fn save_profiles(&self, doc: &ProfilesDoc) -> StoreResult<()> {
        let path = self.dir.profiles_file();
        backup_file(&path, &self.dir.backups_dir())?;
        write_json_atomic(&path, doc)
    }

    fn load_mappings(&self, profile: &str) -> StoreResult<MappingDoc> {
        Ok(read_document_opt(&self.dir.mapping_file(profile))?
            .unwrap_or_else(|| MappingDoc::empty(profile)))
    }

    fn save_mappings(&self, doc: &MappingDoc) -> StoreResult<()> {
        write_json_atomic(&self.dir.mapping_file(&doc.profile), doc)
    }

    fn backup_mappings(&self, profile: &str) -> StoreResult<()> {
        backup_file(&self.dir.mapping_file(profile), &self.dir.backups_dir())?;
        Ok(())
    }

    fn require_profile(&self, name: &str) -> StoreResult<Profile> {
        self.get_profile(name)?
            .ok_or_else(|| StoreError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    // Profiles

    pub fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        Ok(self.load_profiles()?.profiles.into_values().collect())
    }

    /// Profile used when none is named explicitly.
    pub fn active_profile(&self) -> StoreResult<String> {
        Ok(self.load_profiles()?.active_profile)
    }

    pub fn get_profile(&self, name: &str) -> StoreResult<Option<Profile>> {
        Ok(self.load_profiles()?.profiles.remove(name))
    }

    /// Create a profile with an empty mapping file. Fails if the name is taken.
    pub fn create_profile(&self, name: &str, description: &str) -> StoreResult<Profile> {
        validate_profile_name(name)?;
        let mut doc = self.load_profiles()?;
        if doc.profiles.contains_key(name) {
            return Err(StoreError::ProfileExists {
                name: name.to_string(),
            });
        }

        let profile = Profile::new(name, description);
        doc.profiles.insert(name.to_string(), profile.clone());
        self.save_profiles(&doc)?;
        self.save_mappings(&MappingDoc::empty(name))?;

        info!(profile = name, "profile created");
        Ok(profile)
    }

    pub fn update_profile(&self, name: &str, update: ProfileUpdate) -> StoreResult<Profile> {
        let mut doc = self.load_profiles()?;
        let profile = doc
            .profiles
            .get_mut(name)
            .ok_or_else(|| StoreError::ProfileNotFound {
                name: name.to_string(),
            })?;
        update.apply(profile);
        let updated = profile.clone();
        self.save_profiles(&doc)?;
        Ok(updated)
    }

    /// Delete a profile and its mapping file. Returns false if it did not exist.
    pub fn delete_profile(&self, name: &str) -> StoreResult<bool> {
        if name == DEFAULT_PROFILE {
            return Err(StoreError::ProtectedProfile {
                name: name.to_string(),
            });
        }

        let mut doc = self.load_profiles()?;
        if doc.profiles.remove(name).is_none() {
            return Ok(false);
        }
        if doc.active_profile == name {
            doc.active_profile = DEFAULT_PROFILE.to_string();
        }
        self.save_profiles(&doc)?;

        let mapping_file = self.dir.mapping_file(name);
        if mapping_file.exists() {
            self.backup_mappings(name)?;
            fs::remove_file(&mapping_file).map_err(|e| StoreError::io(&mapping_file, e))?;
        }

        info!(profile = name, "profile deleted");
        Ok(true)
    }

    // Mappings

    pub fn get_mappings(&self, profile: &str) -> StoreResult<BTreeMap<String, MappingEntry>> {
        self.require_profile(profile)?;
        Ok(self.load_mappings(profile)?.mappings)
    }

    /// Insert or overwrite `external`. The previous file is backed up first.
    pub fn add_mapping(
        &self,
        profile: &str,
        external: &str,
        internal: &str,
        notes: Option<&str>,
    ) -> StoreResult<MappingEntry> {
        self.require_profile(profile)?;
        self.backup_mappings(profile)?;

        let mut doc = self.load_mappings(profile)?;
        let entry = MappingEntry {
            internal_name: internal.to_string(),
            added_at: now_rfc3339(),
            notes: notes.filter(|n| !n.is_empty()).map(str::to_string),
        };
        if doc
            .mappings
            .insert(external.to_string(), entry.clone())
            .is_some()
        {
            debug!(profile, external, "mapping overwritten");
        }
        self.save_mappings(&doc)?;
        Ok(entry)
    }

    /// Remove `external`. Returns false if there was no such mapping.
    pub fn remove_mapping(&self, profile: &str, external: &str) -> StoreResult<bool> {
        self.require_profile(profile)?;
        let mut doc = self.load_mappings(profile)?;
        if !doc.mappings.contains_key(external) {
            return Ok(false);
        }

        self.backup_mappings(profile)?;
        doc.mappings.remove(external);
        self.save_mappings(&doc)?;
        Ok(true)
    }

    /// Internal name for `external`, or `external` itself when unmapped.
    ///
    /// Never fails: an unreadable mapping file degrades to identity with a warning.
    pub fn resolve(&self, profile: &str, external: &str) -> String {
        match self.load_mappings(profile) {
            Ok(doc) => doc
                .mappings
                .get(external)
                .map(|e| e.internal_name.clone())
                .unwrap_or_else(|| external.to_string()),
            Err(e) => {
                warn!(profile, error = %e, "mapping file unreadable, using name unchanged");
                external.to_string()
            }
        }
    }

    /// Structural problems with a profile's mapping file (empty when valid).
    pub fn validate(&self, profile: &str) -> Vec<String> {
        let path = self.dir.mapping_file(profile);
        if !path.exists() {
            return vec![format!("mapping file not found: {}", path.display())];
        }

        let value: Value = match read_document(&path) {
            Ok(v) => v,
            Err(e) => return vec![e.to_string()],
        };

        let Some(mappings) = value.get("mappings") else {
            return vec!["missing 'mappings' key".to_string()];
        };
        let Some(mappings) = mappings.as_object() else {
            return vec!["'mappings' must be an object".to_string()];
        };

        let mut errors = Vec::new();
        for (external, entry) in mappings {
            match entry.as_object() {
                None => errors.push(format!("invalid entry for '{}': expected object", external)),
                Some(obj) => match obj.get("internal_name") {
                    Some(Value::String(s)) if !s.is_empty() => {}
                    Some(_) => errors.push(format!(
                        "'internal_name' for '{}' must be a non-empty string",
                        external
                    )),
                    None => errors.push(format!("missing 'internal_name' for '{}'", external)),
                },
            }
        }
        errors
    }

    // Export / import

    /// Profile plus mappings, with credential-like keys stripped.
    pub fn export_profile(&self, name: &str) -> StoreResult<Value> {
        let profile = self.require_profile(name)?;
        let mappings = self.load_mappings(name)?.mappings;

        let mut export = serde_json::json!({
            "profile": profile,
            "mappings": mappings,
        });
        strip_sensitive_keys(&mut export);
        Ok(export)
    }

    /// Create a profile from an export document. Rejects existing names.
    pub fn import_profile(&self, data: &Value) -> StoreResult<Profile> {
        let profile = data
            .get("profile")
            .and_then(Value::as_object)
            .ok_or_else(|| StoreError::InvalidImport {
                reason: "missing 'profile' object".into(),
            })?;
        let name = profile
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| StoreError::InvalidImport {
                reason: "missing profile name".into(),
            })?;
        if self.get_profile(name)?.is_some() {
            return Err(StoreError::ProfileExists {
                name: name.to_string(),
            });
        }

        let mappings = match data.get("mappings") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(m)) => m.clone(),
            Some(_) => {
                return Err(StoreError::InvalidImport {
                    reason: "'mappings' must be an object".into(),
                })
            }
        };
        let mut rules = Vec::with_capacity(mappings.len());
        for (external, entry) in &mappings {
            let internal = entry
                .get("internal_name")
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::InvalidImport {
                    reason: format!("mapping '{}' has no internal_name", external),
                })?;
            let notes = entry.get("notes").and_then(Value::as_str);
            rules.push((external.as_str(), internal, notes));
        }

        let text = |key: &str| profile.get(key).and_then(Value::as_str).map(str::to_string);
        self.create_profile(name, &text("description").unwrap_or_default())?;
        let imported = self.update_profile(
            name,
            ProfileUpdate {
                description: None,
                gitlab_url: text("gitlab_url"),
                remote_template: text("remote_template"),
                output_dir: text("output_dir"),
            },
        )?;
        for (external, internal, notes) in rules {
            self.add_mapping(name, external, internal, notes)?;
        }

        info!(profile = name, mappings = mappings.len(), "profile imported");
        Ok(imported)
    }
}

/// Recursively drop object keys containing a credential-like substring.
pub fn strip_sensitive_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| {
                let lower = key.to_ascii_lowercase();
                !SENSITIVE_KEY_PARTS.iter().any(|part| lower.contains(part))
            });
            map.values_mut().for_each(strip_sensitive_keys);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_sensitive_keys),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_nested_credential_keys() {
        let mut value = json!({
            "profile": {"name": "a", "api_key": "x", "Password": "y"},
            "list": [{"token_id": 1, "keep": 2}],
            "description": "ok"
        });
        strip_sensitive_keys(&mut value);
        assert_eq!(
            value,
            json!({"profile": {"name": "a"}, "list": [{"keep": 2}], "description": "ok"})
        );
    }
}
