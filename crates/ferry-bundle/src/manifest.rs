//! Bundle manifest (`manifest.json` at the bundle root).
//!
//! Contract: the field set below is the wire format between the producer and
//! consumer machines. Encoding always writes every mandatory field; decoding
//! defaults the optional ones so that older manifests keep working.

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, BundleResult};
use crate::naming::{derive_repo_name, is_valid_repo_name};

/// Bundle descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Origin clone URL, without credentials.
    pub repo_url: String,
    /// Filesystem-safe repository identifier; also the bundle root directory name.
    pub repo_name: String,
    /// UTC timestamp, `YYYYMMDDTHHMMSSZ`.
    pub created_at: String,
    /// Output of `git --version` on the producer (informational).
    pub git_version: String,
    pub with_submodules: bool,
    pub submodules: Vec<SubmoduleEntry>,
    pub with_artifacts: bool,
    pub artifacts: Vec<ArtifactEntry>,
    /// Base URL of the private GitLab the bundle was produced from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_gitlab_url: Option<String>,
    /// Project path inside `source_gitlab_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_path: Option<String>,
}

/// One submodule mirror shipped in the bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmoduleEntry {
    /// Path of the submodule inside the superproject worktree.
    pub path: String,
    /// Clone URL from `.gitmodules`.
    pub url: String,
    /// Mirror location relative to the bundle root (opaque key).
    pub mirror: String,
}

impl SubmoduleEntry {
    /// Directory name of the mirror under `submodules/` (last component of `mirror`).
    pub fn mirror_dir_name(&self) -> &str {
        self.mirror
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.mirror)
    }
}

/// One CI job artifact archive shipped in the bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub job_id: u64,
    pub job_name: String,
    pub file_name: String,
    pub file_size: u64,
    pub pipeline_id: u64,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// Lenient on-disk shape used for decoding.
#[derive(Deserialize)]
struct RawManifest {
    repo_url: Option<String>,
    repo_name: Option<String>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    git_version: String,
    #[serde(default)]
    with_submodules: bool,
    #[serde(default)]
    submodules: Vec<SubmoduleEntry>,
    #[serde(default)]
    with_artifacts: bool,
    #[serde(default)]
    artifacts: Vec<ArtifactEntry>,
    #[serde(default)]
    source_gitlab_url: Option<String>,
    #[serde(default)]
    repo_path: Option<String>,
}

impl Manifest {
    /// Serialize to pretty-printed JSON.
    pub fn encode(&self) -> BundleResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize, defaulting optional fields.
    ///
    /// `repo_url` is mandatory. A missing or empty `repo_name` is derived from
    /// `repo_url`.
    pub fn decode(bytes: &[u8]) -> BundleResult<Self> {
        let raw: RawManifest = serde_json::from_slice(bytes)?;

        let repo_url = raw
            .repo_url
            .filter(|u| !u.is_empty())
            .ok_or(BundleError::MissingField { field: "repo_url" })?;

        let repo_name = match raw.repo_name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => derive_repo_name(&repo_url).map_err(|e| BundleError::InvalidManifest {
                reason: format!("repo_name missing and not derivable: {}", e),
            })?,
        };

        Ok(Self {
            repo_url,
            repo_name,
            created_at: raw.created_at,
            git_version: raw.git_version,
            with_submodules: raw.with_submodules,
            submodules: raw.submodules,
            with_artifacts: raw.with_artifacts,
            artifacts: raw.artifacts,
            source_gitlab_url: raw.source_gitlab_url,
            repo_path: raw.repo_path,
        })
    }

    /// Check structural invariants.
    ///
    /// - `repo_name` matches `^[A-Za-z0-9._-]+$`
    /// - `submodules` is non-empty only when `with_submodules`
    /// - `artifacts` is non-empty only when `with_artifacts`
    /// - submodule mirrors stay inside the bundle
    pub fn validate(&self) -> BundleResult<()> {
        if !is_valid_repo_name(&self.repo_name) {
            return Err(BundleError::InvalidRepoName {
                name: self.repo_name.clone(),
                reason: "must match ^[A-Za-z0-9._-]+$".into(),
            });
        }
        if !self.with_submodules && !self.submodules.is_empty() {
            return Err(BundleError::InvalidManifest {
                reason: "submodules listed but with_submodules is false".into(),
            });
        }
        if !self.with_artifacts && !self.artifacts.is_empty() {
            return Err(BundleError::InvalidManifest {
                reason: "artifacts listed but with_artifacts is false".into(),
            });
        }
        for sub in &self.submodules {
            let dir = sub.mirror_dir_name();
            if dir.is_empty() || dir == "." || dir == ".." || sub.mirror.starts_with('/') {
                return Err(BundleError::InvalidManifest {
                    reason: format!("submodule '{}' has unusable mirror path '{}'", sub.path, sub.mirror),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        Manifest {
            repo_url: "https://git.example.com/team/app.git".into(),
            repo_name: "app".into(),
            created_at: "20250301T101500Z".into(),
            git_version: "git version 2.43.0".into(),
            with_submodules: true,
            submodules: vec![SubmoduleEntry {
                path: "vendor/lib".into(),
                url: "https://git.example.com/team/lib.git".into(),
                mirror: "submodules/lib.git".into(),
            }],
            with_artifacts: true,
            artifacts: vec![ArtifactEntry {
                job_id: 42,
                job_name: "build".into(),
                file_name: "artifacts.zip".into(),
                file_size: 1024,
                pipeline_id: 7,
                git_ref: "main".into(),
            }],
            source_gitlab_url: Some("https://git.example.com".into()),
            repo_path: Some("team/app".into()),
        }
    }

    #[test]
    fn encode_then_decode_preserves_fields() {
        let manifest = sample();
        let decoded = Manifest::decode(&manifest.encode().unwrap()).unwrap();
        assert_eq!(decoded, manifest);
    }

    #[test]
    fn encode_writes_ref_key_and_mandatory_fields() {
        let value: serde_json::Value = serde_json::from_slice(&sample().encode().unwrap()).unwrap();
        assert_eq!(value["artifacts"][0]["ref"], "main");
        for key in [
            "repo_url",
            "repo_name",
            "created_at",
            "git_version",
            "with_submodules",
            "submodules",
            "with_artifacts",
            "artifacts",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn optional_gitlab_fields_are_omitted_when_absent() {
        let mut manifest = sample();
        manifest.source_gitlab_url = None;
        manifest.repo_path = None;
        let value: serde_json::Value = serde_json::from_slice(&manifest.encode().unwrap()).unwrap();
        assert!(value.get("source_gitlab_url").is_none());
        assert!(value.get("repo_path").is_none());
    }

    #[test]
    fn decode_defaults_missing_optional_fields() {
        let json = br#"{"repo_url": "https://host/team/app.git", "repo_name": "app"}"#;
        let manifest = Manifest::decode(json).unwrap();
        assert!(!manifest.with_submodules);
        assert!(manifest.submodules.is_empty());
        assert!(!manifest.with_artifacts);
        assert!(manifest.artifacts.is_empty());
        assert!(manifest.source_gitlab_url.is_none());
        assert_eq!(manifest.created_at, "");
    }

    #[test]
    fn decode_derives_missing_repo_name() {
        let json = br#"{"repo_url": "https://host/team/my-service.git"}"#;
        assert_eq!(Manifest::decode(json).unwrap().repo_name, "my-service");

        let json = br#"{"repo_url": "https://host/team/my-service.git", "repo_name": ""}"#;
        assert_eq!(Manifest::decode(json).unwrap().repo_name, "my-service");
    }

    #[test]
    fn underivable_repo_name_is_corrupt_not_validation() {
        let err = Manifest::decode(br#"{"repo_url": "https://host/.git"}"#).unwrap_err();
        assert!(matches!(err, BundleError::InvalidManifest { .. }), "{err}");
        assert!(err.is_corrupt());
        assert!(!err.is_validation());
    }

    #[test]
    fn decode_requires_repo_url() {
        let err = Manifest::decode(br#"{"repo_name": "app"}"#).unwrap_err();
        assert!(matches!(err, BundleError::MissingField { field: "repo_url" }));
        assert!(err.is_corrupt());
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let err = Manifest::decode(b"{not json").unwrap_err();
        assert!(matches!(err, BundleError::ManifestJson(_)));
    }

    #[test]
    fn validate_enforces_flag_invariants() {
        let mut manifest = sample();
        manifest.with_submodules = false;
        assert!(manifest.validate().is_err());

        let mut manifest = sample();
        manifest.with_artifacts = false;
        assert!(manifest.validate().is_err());

        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_repo_name_and_escaping_mirror() {
        let mut manifest = sample();
        manifest.repo_name = "../etc".into();
        assert!(manifest.validate().is_err());

        let mut manifest = sample();
        manifest.submodules[0].mirror = "submodules/..".into();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn mirror_dir_name_is_last_component() {
        let entry = &sample().submodules[0];
        assert_eq!(entry.mirror_dir_name(), "lib.git");
    }
}
