//! Operator configuration directory for ferry.
//!
//! Owns everything that lives on the machine running the CLI: profiles and
//! their repository mappings, timestamped backups, the ingest history ledger,
//! and the locally cached copy of the shared mapping dictionary.

pub mod dictionary;
pub mod error;
pub mod history;
pub mod io;
pub mod legacy;
pub mod mapping;
pub mod paths;
pub mod profile;

pub use dictionary::{
    fetcher_from_settings, pull_dictionary, DictionaryEntry, DictionaryFetcher, DisabledFetcher,
    MappingDictionary, ObjectStoreFetcher, S3Settings, DEFAULT_DICTIONARY_KEY,
};
pub use error::{StoreError, StoreResult};
pub use history::{HistoryEntry, HistoryLedger, HistoryStatus, IngestAttempt};
pub use io::DocFormat;
pub use legacy::load_mapping_file;
pub use mapping::{strip_sensitive_keys, MappingEntry, MappingStore};
pub use paths::{ConfigDir, CONFIG_DIR_ENV};
pub use profile::{Profile, ProfileUpdate, DEFAULT_PROFILE};
