use clap::Args;
use std::path::PathBuf;

use super::ConfigArgs;

/// Options shared by `ingest` and `ingest-dir`.
#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Push URL template with {repo}, {username} and {password} placeholders
    /// [default: profile remote_template]
    #[arg(long, env = "FERRY_REMOTE_TEMPLATE")]
    pub remote_template: Option<String>,

    #[arg(long, env = "FERRY_REMOTE_USERNAME")]
    pub username: Option<String>,

    #[arg(long, env = "FERRY_REMOTE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Legacy JSON mapping file instead of the profile mappings
    #[arg(long, value_name = "FILE", conflicts_with = "mapping_dict")]
    pub mapping: Option<PathBuf>,

    /// Resolve names through the cached shared mapping dictionary
    #[arg(long)]
    pub mapping_dict: bool,

    /// Profile for mapping resolution [default: active profile]
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Do not record attempts in the history ledger
    #[arg(long)]
    pub no_record_history: bool,

    /// Skip TLS certificate verification for git pushes
    #[arg(long)]
    pub insecure: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Bundle produced by `ferry pack`
    #[arg(long, value_name = "FILE")]
    pub tar: PathBuf,

    /// Copy bundled CI artifacts into this directory
    #[arg(long, value_name = "DIR")]
    pub artifacts_output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args, Debug, Clone)]
pub struct IngestDirArgs {
    /// Folder containing *.tar.gz bundles
    #[arg(long, value_name = "DIR")]
    pub drop_dir: PathBuf,

    #[command(flatten)]
    pub remote: RemoteArgs,
}
