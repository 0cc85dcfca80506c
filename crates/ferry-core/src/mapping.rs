//! Where ingest looks up target repository names.

use std::collections::BTreeMap;

use ferry_store::{MappingDictionary, MappingStore};

/// Name resolver consulted once per pushed mirror.
///
/// Every variant degrades to identity: an unknown name resolves to itself.
#[derive(Debug)]
pub enum MappingSource<'a> {
    /// Profile-scoped mappings from the configuration directory.
    Profile {
        store: &'a MappingStore,
        profile: String,
    },
    /// Flat `{external: internal}` map from a legacy mapping file.
    LegacyFile(BTreeMap<String, String>),
    /// Cached shared dictionary, resolved through `internal_repo`.
    Dictionary(MappingDictionary),
    PassThrough,
}

impl MappingSource<'_> {
    pub fn resolve(&self, external: &str) -> String {
        match self {
            Self::Profile { store, profile } => store.resolve(profile, external),
            Self::LegacyFile(map) => map
                .get(external)
                .cloned()
                .unwrap_or_else(|| external.to_string()),
            Self::Dictionary(dict) => dict.resolve(external),
            Self::PassThrough => external.to_string(),
        }
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Profile { profile, .. } => format!("profile '{}'", profile),
            Self::LegacyFile(map) => format!("mapping file ({} entries)", map.len()),
            Self::Dictionary(dict) => format!("mapping dictionary ({} entries)", dict.len()),
            Self::PassThrough => "pass-through".to_string(),
        }
    }
}
