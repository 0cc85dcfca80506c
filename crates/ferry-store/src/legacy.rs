//! Stand-alone mapping files passed with `ingest --mapping`.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::io::read_document;

/// Load an `external -> internal` table from a JSON or YAML file.
///
/// Accepted shapes:
/// - flat: `{"app": "internal/app"}`
/// - structured: `{"mappings": {"app": {"internal_name": "internal/app"}}}`
///   (entries may also be plain strings or carry `internal_repo`)
pub fn load_mapping_file(path: &Path) -> StoreResult<BTreeMap<String, String>> {
    let value: Value = read_document(path)?;
    let invalid = |reason: String| StoreError::InvalidContent {
        path: path.to_path_buf(),
        reason,
    };

    let root = value
        .as_object()
        .ok_or_else(|| invalid("expected an object at top level".into()))?;

    let (entries, structured) = match root.get("mappings") {
        Some(Value::Object(m)) => (m, true),
        Some(_) => return Err(invalid("'mappings' must be an object".into())),
        None => (root, false),
    };

    let mut table = BTreeMap::new();
    for (external, entry) in entries {
        let internal = match entry {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) if structured => obj
                .get("internal_name")
                .or_else(|| obj.get("internal_repo"))
                .and_then(Value::as_str),
            _ => None,
        };
        let internal =
            internal.ok_or_else(|| invalid(format!("no internal name for '{}'", external)))?;
        table.insert(external.clone(), internal.to_string());
    }
    Ok(table)
}
