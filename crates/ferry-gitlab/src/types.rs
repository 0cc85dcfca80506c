//! API payloads. Only the fields ferry reads are modelled.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    #[serde(default)]
    pub path_with_namespace: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Pipeline {
    pub id: u64,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub artifacts: Vec<JobArtifactFile>,
}

impl Job {
    pub fn has_artifacts(&self) -> bool {
        !self.artifacts.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct JobArtifactFile {
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}
