//! Shared mapping dictionary pulled from S3-compatible storage.
//!
//! The dictionary is a single JSON object
//! `{"mappings": {external: {"internal_repo", "internal_url", "team"}}}`
//! maintained outside ferry. It is downloaded on demand and cached as
//! `mapping-dict.json`; lookups only ever read the cache.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, GetOptions, ObjectStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::io::{read_document_opt, write_json_atomic};

/// Object key used when none is configured.
pub const DEFAULT_DICTIONARY_KEY: &str = "mapping-dict.json";

const CAPABILITY: &str = "mapping dictionary";

/// Connection settings persisted in `s3_settings.json`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3Settings {
    pub endpoint_url: String,
    pub bucket_name: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_verify_ssl() -> bool {
    true
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint_url", &self.endpoint_url)
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .field("access_key", &self.access_key.as_ref().map(|_| "<set>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

impl S3Settings {
    pub fn new(endpoint_url: impl Into<String>, bucket_name: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            bucket_name: bucket_name.into(),
            region: default_region(),
            access_key: None,
            secret_key: None,
            verify_ssl: true,
        }
    }

    /// Endpoint and bucket are both set.
    pub fn is_configured(&self) -> bool {
        !self.endpoint_url.trim().is_empty() && !self.bucket_name.trim().is_empty()
    }

    pub fn load(path: &Path) -> StoreResult<Option<Self>> {
        read_document_opt(path)
    }

    pub fn save(&self, path: &Path) -> StoreResult<()> {
        write_json_atomic(path, self)
    }

    /// Remove the settings file if present.
    pub fn clear(path: &Path) -> StoreResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

/// One dictionary row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub internal_repo: String,
    #[serde(default)]
    pub internal_url: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

/// Parsed dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingDictionary {
    #[serde(default)]
    pub mappings: BTreeMap<String, DictionaryEntry>,
}

impl MappingDictionary {
    pub fn from_value(value: Value, origin: &str) -> StoreResult<Self> {
        serde_json::from_value(value).map_err(|e| StoreError::InvalidContent {
            path: origin.into(),
            reason: e.to_string(),
        })
    }

    pub fn lookup(&self, external: &str) -> Option<&DictionaryEntry> {
        self.mappings.get(external)
    }

    /// `internal_repo` for `external`, or `external` unchanged.
    pub fn resolve(&self, external: &str) -> String {
        self.lookup(external)
            .map(|e| e.internal_repo.clone())
            .unwrap_or_else(|| external.to_string())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Read the local cache; a missing file is an empty dictionary.
    pub fn load_cached(path: &Path) -> StoreResult<Self> {
        Ok(read_document_opt(path)?.unwrap_or_default())
    }
}

/// Capability: "given bucket/key, return a JSON blob".
#[async_trait]
pub trait DictionaryFetcher: Send + Sync {
    async fn fetch(&self, bucket: &str, key: &str) -> StoreResult<Value>;

    /// Fails unless `bucket` is reachable with the configured credentials.
    async fn check_connection(&self, bucket: &str) -> StoreResult<()>;
}

/// Fetcher backed by `object_store`.
pub struct ObjectStoreFetcher {
    backend: Backend,
}

enum Backend {
    /// Real S3 endpoint; a client is built per bucket.
    S3(S3Settings),
    /// Pre-built store, bucket argument ignored (in-memory, tests).
    Fixed(Arc<dyn ObjectStore>),
}

impl ObjectStoreFetcher {
    pub fn s3(settings: S3Settings) -> Self {
        Self {
            backend: Backend::S3(settings),
        }
    }

    pub fn from_store(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            backend: Backend::Fixed(store),
        }
    }

    fn store_for(&self, bucket: &str) -> StoreResult<Arc<dyn ObjectStore>> {
        match &self.backend {
            Backend::Fixed(store) => Ok(Arc::clone(store)),
            Backend::S3(settings) => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_endpoint(&settings.endpoint_url)
                    .with_bucket_name(bucket)
                    .with_region(&settings.region)
                    .with_allow_http(settings.endpoint_url.starts_with("http://"))
                    .with_client_options(
                        ClientOptions::new().with_allow_invalid_certificates(!settings.verify_ssl),
                    );
                if let (Some(key), Some(secret)) = (&settings.access_key, &settings.secret_key) {
                    builder = builder
                        .with_access_key_id(key)
                        .with_secret_access_key(secret);
                }
                let store = builder.build().map_err(|e| StoreError::ObjectStore {
                    message: format!("failed to create S3 client: {}", e),
                })?;
                Ok(Arc::new(store))
            }
        }
    }
}

#[async_trait]
impl DictionaryFetcher for ObjectStoreFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> StoreResult<Value> {
        let store = self.store_for(bucket)?;
        let location = ObjectPath::from(key);
        let bytes = store
            .get_opts(&location, GetOptions::default())
            .await
            .map_err(|e| StoreError::from_object_store(e, key))?
            .bytes()
            .await
            .map_err(|e| StoreError::from_object_store(e, key))?;

        serde_json::from_slice(&bytes).map_err(|e| StoreError::InvalidContent {
            path: key.into(),
            reason: e.to_string(),
        })
    }

    async fn check_connection(&self, bucket: &str) -> StoreResult<()> {
        let store = self.store_for(bucket)?;
        let listing = store
            .list_with_delimiter(None)
            .await
            .map_err(|e| StoreError::from_object_store(e, bucket))?;
        debug!(bucket, objects = listing.objects.len(), "bucket reachable");
        Ok(())
    }
}

/// Stand-in used when no S3 settings exist; every fetch fails fast.
#[derive(Debug, Clone)]
pub struct DisabledFetcher {
    reason: String,
}

impl DisabledFetcher {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn not_configured(&self) -> StoreError {
        StoreError::NotConfigured {
            capability: CAPABILITY,
            message: self.reason.clone(),
        }
    }
}

#[async_trait]
impl DictionaryFetcher for DisabledFetcher {
    async fn fetch(&self, _bucket: &str, _key: &str) -> StoreResult<Value> {
        Err(self.not_configured())
    }

    async fn check_connection(&self, _bucket: &str) -> StoreResult<()> {
        Err(self.not_configured())
    }
}

/// Pick the fetcher implementation from the persisted settings.
pub fn fetcher_from_settings(settings: Option<&S3Settings>) -> Box<dyn DictionaryFetcher> {
    match settings {
        Some(s) if s.is_configured() => Box::new(ObjectStoreFetcher::s3(s.clone())),
        _ => Box::new(DisabledFetcher::new(
            "run `ferry dict configure` to set endpoint and bucket",
        )),
    }
}

/// Download the dictionary, validate it and refresh the local cache.
pub async fn pull_dictionary(
    fetcher: &dyn DictionaryFetcher,
    bucket: &str,
    key: &str,
    cache_path: &Path,
) -> StoreResult<MappingDictionary> {
    let raw = fetcher.fetch(bucket, key).await?;
    let dict = MappingDictionary::from_value(raw.clone(), key)?;
    write_json_atomic(cache_path, &raw)?;
    info!(bucket, key, entries = dict.len(), "mapping dictionary cached");
    Ok(dict)
}
