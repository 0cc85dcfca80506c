//! CI artifact harvesting for bundles.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use ferry_bundle::{paths, sanitize_repo_name, ArtifactEntry};
use ferry_gitlab::{GitLabClient, GitLabError};
use tracing::{info, warn};

use crate::error::{PackError, PackResult};

/// Result of one harvest: downloaded entries plus per-job problems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactHarvest {
    pub entries: Vec<ArtifactEntry>,
    pub warnings: Vec<String>,
}

/// Source of CI artifacts for a repository.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Download artifacts of the latest successful pipeline on `git_ref`
    /// (the project's default branch when `None`) into
    /// `artifacts_dir/<job>/artifacts.zip`.
    ///
    /// Fails when the project or a successful pipeline cannot be found. A job
    /// whose download fails is reported in `warnings` and skipped.
    async fn collect(
        &self,
        repo_path: &str,
        git_ref: Option<&str>,
        artifacts_dir: &Path,
    ) -> PackResult<ArtifactHarvest>;
}

/// [`ArtifactSource`] backed by the GitLab REST API.
pub struct GitLabArtifacts<'a> {
    client: &'a GitLabClient,
}

impl<'a> GitLabArtifacts<'a> {
    pub fn new(client: &'a GitLabClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactSource for GitLabArtifacts<'_> {
    async fn collect(
        &self,
        repo_path: &str,
        git_ref: Option<&str>,
        artifacts_dir: &Path,
    ) -> PackResult<ArtifactHarvest> {
        let project = self.client.get_project(repo_path).await?;
        let project_id = project.id;
        let wanted_ref = git_ref
            .filter(|r| !r.is_empty())
            .or(project.default_branch.as_deref());
        let pipeline = self
            .client
            .latest_successful_pipeline(project_id, wanted_ref)
            .await?
            .ok_or_else(|| PackError::NoSuccessfulPipeline {
                repo_path: repo_path.to_string(),
            })?;
        let pipeline_ref = pipeline
            .git_ref
            .clone()
            .or_else(|| wanted_ref.map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        let project_name = project.path_with_namespace.as_deref().unwrap_or(repo_path);
        info!(
            project = %project_name,
            project_id,
            pipeline_id = pipeline.id,
            git_ref = %pipeline_ref,
            "using pipeline"
        );

        let jobs = self.client.jobs_with_artifacts(project_id, pipeline.id).await?;
        let mut harvest = ArtifactHarvest::default();
        let mut used = HashSet::new();

        for job in jobs {
            let dir_name = job_dir_name(&job.name, job.id, &mut used);
            let dest = artifacts_dir.join(&dir_name).join(paths::ARTIFACT_FILE);

            match self.client.download_job_artifacts(project_id, job.id, &dest).await {
                Ok(size) => {
                    info!(job = %job.name, job_id = job.id, bytes = size, "downloaded artifacts");
                    harvest.entries.push(ArtifactEntry {
                        job_id: job.id,
                        job_name: job.name,
                        file_name: paths::ARTIFACT_FILE.to_string(),
                        file_size: size,
                        pipeline_id: pipeline.id,
                        git_ref: pipeline_ref.clone(),
                    });
                }
                Err(e) => {
                    let message = download_warning(&job.name, job.id, &e);
                    warn!("{}", message);
                    harvest.warnings.push(message);
                }
            }
        }
        Ok(harvest)
    }
}

/// Directory for a job's artifacts: sanitized job name, unique per bundle.
pub(crate) fn job_dir_name(name: &str, id: u64, used: &mut HashSet<String>) -> String {
    let base = sanitize_repo_name(name).unwrap_or_else(|_| format!("job-{}", id));
    let dir = if used.contains(&base) {
        format!("{}-{}", base, id)
    } else {
        base
    };
    used.insert(dir.clone());
    dir
}

fn download_warning(job: &str, id: u64, err: &GitLabError) -> String {
    format!("skipped artifacts of job '{}' ({}): {}", job, id, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_dirs_are_sanitized_and_unique() {
        let mut used = HashSet::new();
        assert_eq!(job_dir_name("build linux", 1, &mut used), "build_linux");
        assert_eq!(job_dir_name("build linux", 2, &mut used), "build_linux-2");
        assert_eq!(job_dir_name("..", 3, &mut used), "job-3");
        assert_eq!(job_dir_name("", 4, &mut used), "job-4");
    }
}
