//! Profile records stored in `profiles.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Name of the profile that always exists and can never be deleted.
pub const DEFAULT_PROFILE: &str = "default";

/// Named configuration scope. Each profile owns one mapping file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Source GitLab base URL used by `pack` when none is given.
    #[serde(default)]
    pub gitlab_url: Option<String>,
    /// Push URL template used by `ingest` when none is given.
    #[serde(default)]
    pub remote_template: Option<String>,
    /// Archive output directory used by `pack` when none is given.
    #[serde(default)]
    pub output_dir: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now_rfc3339();
        Self {
            name: name.into(),
            description: description.into(),
            gitlab_url: None,
            remote_template: None,
            output_dir: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Partial update for [`Profile`]. `None` leaves a field untouched; an empty
/// string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub description: Option<String>,
    pub gitlab_url: Option<String>,
    pub remote_template: Option<String>,
    pub output_dir: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.gitlab_url.is_none()
            && self.remote_template.is_none()
            && self.output_dir.is_none()
    }

    pub(crate) fn apply(self, profile: &mut Profile) {
        if let Some(description) = self.description {
            profile.description = description;
        }
        set_optional(&mut profile.gitlab_url, self.gitlab_url);
        set_optional(&mut profile.remote_template, self.remote_template);
        set_optional(&mut profile.output_dir, self.output_dir);
        profile.updated_at = now_rfc3339();
    }
}

fn set_optional(field: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *field = Some(v).filter(|v| !v.is_empty());
    }
}

/// On-disk shape of `profiles.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProfilesDoc {
    #[serde(default = "default_profile_name")]
    pub active_profile: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfilesDoc {
    pub fn bootstrap() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            DEFAULT_PROFILE.to_string(),
            Profile::new(DEFAULT_PROFILE, "Default profile"),
        );
        Self {
            active_profile: DEFAULT_PROFILE.to_string(),
            profiles,
        }
    }
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

/// Profile names are used as file names under `mappings/`.
pub fn validate_profile_name(name: &str) -> StoreResult<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name cannot be a relative path component")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        Some("only letters, digits, '.', '_' and '-' are allowed")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidProfileName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_sets_and_clears_optional_fields() {
        let mut profile = Profile::new("team-a", "");
        profile.updated_at = "2000-01-01T00:00:00Z".into();

        ProfileUpdate {
            gitlab_url: Some("https://gitlab.example.com".into()),
            output_dir: Some("/srv/out".into()),
            ..Default::default()
        }
        .apply(&mut profile);
        assert_eq!(profile.gitlab_url.as_deref(), Some("https://gitlab.example.com"));
        assert_eq!(profile.output_dir.as_deref(), Some("/srv/out"));
        assert_ne!(profile.updated_at, "2000-01-01T00:00:00Z");

        ProfileUpdate {
            gitlab_url: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut profile);
        assert!(profile.gitlab_url.is_none());
        assert_eq!(profile.output_dir.as_deref(), Some("/srv/out"));
    }

    #[test]
    fn profile_names_are_file_safe() {
        assert!(validate_profile_name("team-a_1.x").is_ok());
        for bad in ["", ".", "..", "a/b", "team a"] {
            assert!(validate_profile_name(bad).is_err(), "{bad:?}");
        }
    }
}
