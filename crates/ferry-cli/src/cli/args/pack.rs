use clap::Args;
use std::path::PathBuf;

use super::ConfigArgs;

#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    /// Clone URL of the source repository
    #[arg(long, conflicts_with_all = ["source_gitlab_url", "repo_path"])]
    pub repo_url: Option<String>,

    /// Base URL of the private GitLab [default: profile gitlab_url]
    #[arg(long)]
    pub source_gitlab_url: Option<String>,

    /// Project path inside GitLab, e.g. group/subgroup/project
    #[arg(long)]
    pub repo_path: Option<String>,

    #[arg(long, env = "FERRY_SOURCE_USERNAME")]
    pub source_username: Option<String>,

    #[arg(long, env = "FERRY_SOURCE_PASSWORD", hide_env_values = true)]
    pub source_password: Option<String>,

    /// Legacy personal access token, used only when no password is given
    #[arg(long, env = "FERRY_SOURCE_TOKEN", hide_env_values = true)]
    pub source_token: Option<String>,

    /// Override the repository name derived from the URL
    #[arg(long)]
    pub repo_name: Option<String>,

    /// Also mirror every submodule listed in .gitmodules
    #[arg(long)]
    pub with_submodules: bool,

    /// Download CI artifacts of the latest successful pipeline (GitLab source only)
    #[arg(long)]
    pub with_artifacts: bool,

    /// Pipeline ref for --with-artifacts [default: the project's default branch]
    #[arg(long, requires = "with_artifacts")]
    pub artifacts_ref: Option<String>,

    /// Output directory for the archive [default: profile output_dir, else .]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Skip TLS certificate verification for git and the GitLab API
    #[arg(long)]
    pub insecure: bool,

    /// Profile providing defaults [default: active profile]
    #[arg(short, long)]
    pub profile: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}
