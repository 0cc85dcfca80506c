//! Repository naming and URL hygiene.
//!
//! Derived names double as directory names inside the bundle and as lookup
//! keys in the mapping store, so they are restricted to `[A-Za-z0-9._-]`.

use crate::error::{BundleError, BundleResult};

/// Fixed-format UTC timestamp used for `created_at` and archive names.
pub const CREATED_AT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Derive a filesystem-safe repository name from a clone URL.
///
/// Takes the last path segment (trailing slashes ignored), strips a `.git`
/// suffix and replaces every character outside `[A-Za-z0-9._-]` with `_`.
///
/// ```
/// use ferry_bundle::derive_repo_name;
///
/// assert_eq!(derive_repo_name("https://git.example.com/team/app.git").unwrap(), "app");
/// assert_eq!(derive_repo_name("https://git.example.com/team/app/").unwrap(), "app");
/// assert!(derive_repo_name("").is_err());
/// ```
pub fn derive_repo_name(repo_url: &str) -> BundleResult<String> {
    let trimmed = repo_url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or_default();
    let stem = last.strip_suffix(".git").unwrap_or(last);
    sanitize_repo_name(stem).map_err(|_| BundleError::InvalidRepoName {
        name: repo_url.to_string(),
        reason: "could not derive repository name".into(),
    })
}

/// Replace disallowed characters with `_` and reject empty or dot-only names.
pub fn sanitize_repo_name(name: &str) -> BundleResult<String> {
    let sanitized: String = name
        .chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect();

    if sanitized.is_empty() {
        return Err(BundleError::InvalidRepoName {
            name: name.to_string(),
            reason: "name is empty".into(),
        });
    }
    if sanitized == "." || sanitized == ".." {
        return Err(BundleError::InvalidRepoName {
            name: name.to_string(),
            reason: "name cannot be a relative path component".into(),
        });
    }
    Ok(sanitized)
}

/// True when `name` already satisfies `^[A-Za-z0-9._-]+$` and is not `.`/`..`.
pub fn is_valid_repo_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && name.chars().all(is_allowed)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Strip userinfo (`user:password@`) from a URL.
///
/// Non-URL inputs such as scp-style `git@host:path` are returned unchanged.
pub fn redact_credentials(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
            // Both setters only fail for cannot-be-a-base URLs, which carry no userinfo.
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}

/// Current UTC time in [`CREATED_AT_FORMAT`].
pub fn created_at_now() -> String {
    chrono::Utc::now().format(CREATED_AT_FORMAT).to_string()
}

/// `<repo_name>-<created_at>.tar.gz`
pub fn archive_file_name(repo_name: &str, created_at: &str) -> String {
    format!("{}-{}.tar.gz", repo_name, created_at)
}
