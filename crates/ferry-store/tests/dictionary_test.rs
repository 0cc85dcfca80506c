//! Mapping dictionary fetch, cache and lookup.

use std::sync::Arc;

use ferry_store::{
    fetcher_from_settings, pull_dictionary, DictionaryFetcher, MappingDictionary,
    ObjectStoreFetcher, S3Settings, StoreError, DEFAULT_DICTIONARY_KEY,
};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutOptions, PutPayload};

async fn put_json(store: &dyn ObjectStore, key: &str, body: &str) {
    store
        .put_opts(
            &Path::from(key),
            PutPayload::from(body.as_bytes().to_vec()),
            PutOptions::default(),
        )
        .await
        .unwrap();
}

const DICT: &str = r#"{
  "mappings": {
    "app": {"internal_repo": "platform/app", "internal_url": "https://git.local/platform/app.git", "team": "platform"},
    "lib": {"internal_repo": "shared/lib"}
  }
}"#;

#[tokio::test]
async fn pull_caches_and_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("mapping-dict.json");

    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    put_json(store.as_ref(), DEFAULT_DICTIONARY_KEY, DICT).await;
    let fetcher = ObjectStoreFetcher::from_store(store);

    let dict = pull_dictionary(&fetcher, "mappings", DEFAULT_DICTIONARY_KEY, &cache)
        .await
        .unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.lookup("app").unwrap().team.as_deref(), Some("platform"));

    let cached = MappingDictionary::load_cached(&cache).unwrap();
    assert_eq!(cached, dict);
    assert_eq!(cached.resolve("lib"), "shared/lib");
    assert_eq!(cached.resolve("unknown"), "unknown");
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let fetcher = ObjectStoreFetcher::from_store(Arc::new(InMemory::new()));
    let err = fetcher.fetch("mappings", "absent.json").await.unwrap_err();
    assert!(matches!(err, StoreError::ObjectNotFound { .. }), "{err}");
}

#[tokio::test]
async fn malformed_dictionary_leaves_cache_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("mapping-dict.json");

    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    put_json(store.as_ref(), "d.json", r#"{"mappings": {"app": {"team": "x"}}}"#).await;
    let fetcher = ObjectStoreFetcher::from_store(store);

    assert!(pull_dictionary(&fetcher, "b", "d.json", &cache).await.is_err());
    assert!(!cache.exists());
}

#[tokio::test]
async fn connection_check_reports_reachability() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    put_json(store.as_ref(), DEFAULT_DICTIONARY_KEY, DICT).await;
    ObjectStoreFetcher::from_store(store)
        .check_connection("mappings")
        .await
        .unwrap();

    let err = fetcher_from_settings(None)
        .check_connection("mappings")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotConfigured { .. }), "{err}");
}

#[tokio::test]
async fn unconfigured_settings_select_disabled_fetcher() {
    let fetcher = fetcher_from_settings(None);
    let err = fetcher.fetch("b", "k").await.unwrap_err();
    assert!(matches!(err, StoreError::NotConfigured { .. }));
    assert_eq!(err.exit_code(), 2);

    let blank = S3Settings::new("", "bucket");
    let err = fetcher_from_settings(Some(&blank))
        .fetch("bucket", "k")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotConfigured { .. }));
}

#[test]
fn settings_defaults_and_redacted_debug() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s3_settings.json");
    assert!(S3Settings::load(&path).unwrap().is_none());

    std::fs::write(
        &path,
        r#"{"endpoint_url": "https://s3.local", "bucket_name": "maps", "secret_key": "hunter2"}"#,
    )
    .unwrap();
    let settings = S3Settings::load(&path).unwrap().unwrap();
    assert_eq!(settings.region, "us-east-1");
    assert!(settings.verify_ssl);
    assert!(settings.is_configured());
    assert!(!format!("{settings:?}").contains("hunter2"));

    S3Settings::clear(&path).unwrap();
    S3Settings::clear(&path).unwrap();
    assert!(!path.exists());
}
