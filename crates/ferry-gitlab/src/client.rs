//! GitLab REST v4 client.
//!
//! All status-code interpretation happens in [`GitLabClient::send`].

use std::path::Path;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::config::GitLabConfig;
use crate::error::{GitLabError, GitLabResult};
use crate::types::{Job, Pipeline, Project};

const USER_AGENT_VALUE: &str = concat!("ferry-gitlab/", env!("CARGO_PKG_VERSION"));
const PRIVATE_TOKEN: &str = "PRIVATE-TOKEN";

/// Which credential the client sends.
#[derive(Clone, PartialEq, Eq)]
enum Auth {
    None,
    Basic { username: String, password: String },
    PrivateToken(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => write!(f, "Basic({username}, <redacted>)"),
            Self::PrivateToken(_) => f.write_str("PrivateToken(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitLabClient {
    client: reqwest::Client,
    api_base: Url,
    auth: Auth,
}

impl GitLabClient {
    pub fn new(config: GitLabConfig) -> GitLabResult<Self> {
        let mut api_base = config.parsed_base()?;
        let base_path = api_base.path().trim_end_matches('/').to_string();
        api_base.set_path(&format!("{}/api/v4", base_path));

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()
            .map_err(|e| GitLabError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        let auth = match (&config.username, &config.password, &config.token) {
            (Some(user), Some(pw), _) if !user.is_empty() && !pw.is_empty() => Auth::Basic {
                username: user.clone(),
                password: pw.clone(),
            },
            (_, _, Some(token)) if !token.is_empty() => Auth::PrivateToken(token.clone()),
            _ => Auth::None,
        };

        Ok(Self {
            client,
            api_base,
            auth,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth != Auth::None
    }

    /// Look up a project by its `group/subgroup/project` path.
    pub async fn get_project(&self, repo_path: &str) -> GitLabResult<Project> {
        let repo_path = repo_path.trim_matches('/');
        let url = self.endpoint(&["projects", repo_path]);
        debug!(url = %url, "resolving project");

        match self.get_json(url).await {
            Err(GitLabError::NotFound { .. }) => Err(GitLabError::ProjectNotFound {
                path: repo_path.to_string(),
            }),
            other => other,
        }
    }

    /// Most recent pipeline with status `success`, for `git_ref` or any ref.
    pub async fn latest_successful_pipeline(
        &self,
        project_id: u64,
        git_ref: Option<&str>,
    ) -> GitLabResult<Option<Pipeline>> {
        let mut url = self.endpoint(&["projects", &project_id.to_string(), "pipelines"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("status", "success")
                .append_pair("per_page", "1")
                .append_pair("order_by", "id")
                .append_pair("sort", "desc");
            if let Some(r) = git_ref.filter(|r| !r.is_empty()) {
                query.append_pair("ref", r);
            }
        }
        debug!(url = %url, "looking up latest successful pipeline");

        let pipelines: Vec<Pipeline> = self.get_json(url).await?;
        Ok(pipelines.into_iter().next())
    }

    /// Jobs of `pipeline_id` that produced artifacts.
    pub async fn jobs_with_artifacts(
        &self,
        project_id: u64,
        pipeline_id: u64,
    ) -> GitLabResult<Vec<Job>> {
        let url = self.endpoint(&[
            "projects",
            &project_id.to_string(),
            "pipelines",
            &pipeline_id.to_string(),
            "jobs",
        ]);
        debug!(url = %url, "listing pipeline jobs");

        let jobs: Vec<Job> = self.get_json(url).await?;
        Ok(jobs.into_iter().filter(Job::has_artifacts).collect())
    }

    /// Stream a job's artifact archive to `dest`; returns the byte count.
    ///
    /// A partially written file is removed on failure.
    pub async fn download_job_artifacts(
        &self,
        project_id: u64,
        job_id: u64,
        dest: &Path,
    ) -> GitLabResult<u64> {
        let url = self.endpoint(&[
            "projects",
            &project_id.to_string(),
            "jobs",
            &job_id.to_string(),
            "artifacts",
        ]);
        debug!(url = %url, dest = %dest.display(), "downloading job artifacts");

        let response = self.send(self.client.get(url.clone()), &url).await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GitLabError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        match write_body(response, dest).await {
            Ok(size) => Ok(size),
            Err(e) => {
                let _ = tokio::fs::remove_file(dest).await;
                Err(e)
            }
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // api_base always has a path, so it is never cannot-be-a-base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> GitLabResult<T> {
        let response = self.send(self.client.get(url.clone()), &url).await?;
        response
            .json()
            .await
            .map_err(|e| GitLabError::InvalidResponse {
                message: format!("failed to parse {}: {}", url.path(), e.without_url()),
            })
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> GitLabResult<Response> {
        let request = match &self.auth {
            Auth::None => request,
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::PrivateToken(token) => request.header(PRIVATE_TOKEN, token),
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let resource = url.path().to_string();

        match status {
            200..=299 => Ok(response),
            401 | 403 => Err(GitLabError::Unauthorized {
                message: format!("HTTP {} for {}", status, resource),
            }),
            404 => Err(GitLabError::NotFound { resource }),
            _ => Err(GitLabError::Status { status, resource }),
        }
    }
}

async fn write_body(mut response: Response, dest: &Path) -> GitLabResult<u64> {
    let io_err = |e: std::io::Error| GitLabError::Io {
        path: dest.to_path_buf(),
        source: e,
    };

    let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_err)?;
    Ok(written)
}
