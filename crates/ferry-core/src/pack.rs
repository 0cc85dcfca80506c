//! Bundle builder.
//!
//! Producer side of the transfer: mirror-clone the source, optionally mirror
//! every submodule and harvest CI artifacts, write the manifest and stage the
//! whole tree into one `<repo_name>-<created_at>.tar.gz`. Clone failures abort
//! before anything is written to the output directory; artifact failures only
//! produce warnings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ferry_bundle::{
    archive_file_name, created_at_now, derive_repo_name, paths, redact_credentials,
    sanitize_repo_name, write_archive, Manifest, SubmoduleEntry,
};
use ferry_gitlab::GitLabConfig;
use tracing::{info, warn};
use url::Url;

use crate::artifacts::ArtifactSource;
use crate::error::{PackError, PackResult};
use crate::git::{self, GitRunner};
use crate::gitmodules::{read_gitmodules, Gitmodule};

/// Where the repository comes from.
#[derive(Debug, Clone)]
pub enum PackSource {
    /// Plain clone URL (may carry credentials).
    Url(String),
    /// Project on a private GitLab; the clone URL is built from `config`.
    GitLab {
        config: GitLabConfig,
        repo_path: String,
    },
}

impl PackSource {
    /// Clone URL including credentials. Never persist or log this value.
    pub fn clone_url(&self) -> PackResult<String> {
        match self {
            Self::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(PackError::InvalidSource {
                        message: "repository URL is empty".into(),
                    });
                }
                Ok(url.to_string())
            }
            Self::GitLab { config, repo_path } => Ok(config.build_clone_url(repo_path)?),
        }
    }

    fn gitlab_parts(&self) -> Option<(&GitLabConfig, &str)> {
        match self {
            Self::GitLab { config, repo_path } => Some((config, repo_path.as_str())),
            Self::Url(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    pub output_dir: PathBuf,
    /// Overrides the name derived from the clone URL (still sanitized).
    pub repo_name: Option<String>,
    pub with_submodules: bool,
    /// Requires a [`PackSource::GitLab`] source.
    pub with_artifacts: bool,
    /// Pipeline ref for artifacts; the project's default branch when unset.
    pub artifacts_ref: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub archive: PathBuf,
    pub manifest: Manifest,
    /// Non-fatal problems (skipped artifacts, empty `.gitmodules`, ...).
    pub warnings: Vec<String>,
}

/// Builds bundles with the given git and artifact capabilities.
pub struct Builder<'a> {
    git: &'a dyn GitRunner,
    artifacts: Option<&'a dyn ArtifactSource>,
}

impl<'a> Builder<'a> {
    pub fn new(git: &'a dyn GitRunner) -> Self {
        Self {
            git,
            artifacts: None,
        }
    }

    pub fn with_artifact_source(mut self, source: &'a dyn ArtifactSource) -> Self {
        self.artifacts = Some(source);
        self
    }

    pub async fn pack(&self, source: &PackSource, options: &PackOptions) -> PackResult<PackOutcome> {
        let artifact_source = self.check_preconditions(source, options)?;

        let clone_url = source.clone_url()?;
        let public_url = redact_credentials(&clone_url);
        let repo_name = match options.repo_name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => sanitize_repo_name(name.trim())?,
            None => derive_repo_name(&public_url)?,
        };

        let scratch = tempfile::Builder::new()
            .prefix("ferry-pack-")
            .tempdir()
            .map_err(|e| PackError::io(std::env::temp_dir(), e))?;
        let bundle_root = scratch.path().join(&repo_name);
        fs::create_dir_all(&bundle_root).map_err(|e| PackError::io(&bundle_root, e))?;

        let git_version = git::git_version(self.git)
            .await
            .map_err(|e| PackError::git("git is not usable", e))?;

        let mirror = paths::mirror_dir(&bundle_root, &repo_name);
        info!(repo = %public_url, dest = %mirror.display(), "cloning mirror");
        git::clone_mirror(self.git, &clone_url, &mirror)
            .await
            .map_err(|e| PackError::git(format!("mirror clone of {} failed", public_url), e))?;

        let mut warnings = Vec::new();

        let submodules = if options.with_submodules {
            let worktree = scratch.path().join("worktree");
            self.mirror_submodules(&clone_url, &worktree, &bundle_root, &mut warnings)
                .await?
        } else {
            Vec::new()
        };

        let artifacts = match artifact_source {
            Some((source, repo_path)) => {
                let dir = bundle_root.join(paths::ARTIFACTS_DIR);
                let harvest = source
                    .collect(repo_path, options.artifacts_ref.as_deref(), &dir)
                    .await?;
                warnings.extend(harvest.warnings);
                if harvest.entries.is_empty() {
                    warn!(repo_path, "no artifacts were downloaded");
                    warnings.push("no artifacts were downloaded".to_string());
                }
                harvest.entries
            }
            None => Vec::new(),
        };

        let (source_gitlab_url, repo_path) = match source.gitlab_parts() {
            Some((config, path)) => (
                Some(redact_credentials(config.base_url.trim())),
                Some(path.trim_matches('/').to_string()),
            ),
            None => (None, None),
        };

        let manifest = Manifest {
            repo_url: public_url,
            repo_name: repo_name.clone(),
            created_at: created_at_now(),
            git_version,
            with_submodules: options.with_submodules,
            submodules,
            with_artifacts: options.with_artifacts,
            artifacts,
            source_gitlab_url,
            repo_path,
        };
        manifest.validate()?;

        let manifest_path = bundle_root.join(paths::MANIFEST);
        fs::write(&manifest_path, manifest.encode()?)
            .map_err(|e| PackError::io(&manifest_path, e))?;

        let archive = options
            .output_dir
            .join(archive_file_name(&repo_name, &manifest.created_at));
        write_archive(&bundle_root, &archive)?;
        info!(archive = %archive.display(), "bundle written");

        Ok(PackOutcome {
            archive,
            manifest,
            warnings,
        })
    }

    fn check_preconditions<'s>(
        &self,
        source: &'s PackSource,
        options: &PackOptions,
    ) -> PackResult<Option<(&'a dyn ArtifactSource, &'s str)>> {
        if !options.with_artifacts {
            return Ok(None);
        }
        let (_, repo_path) = source.gitlab_parts().ok_or_else(|| PackError::Config {
            message: "artifacts can only be collected from a GitLab source \
                      (--source-gitlab-url and --repo-path)"
                .into(),
        })?;
        let artifacts = self.artifacts.ok_or_else(|| PackError::Config {
            message: "artifact collection is not configured".into(),
        })?;
        Ok(Some((artifacts, repo_path)))
    }

    async fn mirror_submodules(
        &self,
        clone_url: &str,
        worktree: &Path,
        bundle_root: &Path,
        warnings: &mut Vec<String>,
    ) -> PackResult<Vec<SubmoduleEntry>> {
        info!("inspecting submodules via shallow recursive clone");
        git::clone_shallow_worktree(self.git, clone_url, worktree)
            .await
            .map_err(|e| PackError::git("worktree clone for submodule discovery failed", e))?;

        let modules = read_gitmodules(worktree)?;
        if modules.is_empty() {
            warn!("no submodules found in .gitmodules");
            warnings.push("no submodules found in .gitmodules".to_string());
            return Ok(Vec::new());
        }

        let plan = plan_submodule_mirrors(&modules)?;
        let sub_dir = bundle_root.join(paths::SUBMODULES_DIR);
        let mut entries = Vec::with_capacity(plan.len());

        for (module, mirror) in modules.iter().zip(plan) {
            let url = resolve_submodule_url(clone_url, &module.url);
            let dest = sub_dir.join(&mirror);
            let public = redact_credentials(&url);
            info!(path = %module.path, url = %public, "cloning submodule mirror");
            git::clone_mirror(self.git, &url, &dest).await.map_err(|e| {
                PackError::git(format!("mirror clone of submodule '{}' failed", module.path), e)
            })?;

            entries.push(SubmoduleEntry {
                path: module.path.clone(),
                url: redact_credentials(&module.url),
                mirror: format!("{}/{}", paths::SUBMODULES_DIR, mirror),
            });
        }
        Ok(entries)
    }
}

/// Mirror directory name for each module, `<last path component>.git`.
///
/// Two modules ending in the same component cannot share a bundle.
fn plan_submodule_mirrors(modules: &[Gitmodule]) -> PackResult<Vec<String>> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut plan = Vec::with_capacity(modules.len());

    for module in modules {
        let last = module
            .path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&module.path);
        let mirror = format!("{}.git", sanitize_repo_name(last)?);
        if let Some(first) = seen.get(&mirror) {
            return Err(PackError::SubmoduleCollision {
                first: (*first).to_string(),
                second: module.path.clone(),
                mirror,
            });
        }
        seen.insert(mirror.clone(), &module.path);
        plan.push(mirror);
    }
    Ok(plan)
}

/// Resolve `./` and `../` submodule URLs against the superproject URL.
pub(crate) fn resolve_submodule_url(super_url: &str, sub_url: &str) -> String {
    if !(sub_url.starts_with("./") || sub_url.starts_with("../")) {
        return sub_url.to_string();
    }
    let base = format!("{}/", super_url.trim_end_matches('/'));
    match Url::parse(&base).and_then(|b| b.join(sub_url)) {
        Ok(joined) => joined.to_string(),
        Err(_) => sub_url.to_string(),
    }
}
