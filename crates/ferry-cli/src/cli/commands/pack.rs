use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use ferry_core::{
    Builder, GitLabArtifacts, GitOptions, PackError, PackOptions, PackSource, SystemGit,
};
use ferry_gitlab::{GitLabClient, GitLabConfig};
use ferry_store::Profile;

use crate::cli::args::PackArgs;
use crate::cli::helpers::{open_store, select_profile};
use crate::exit_codes::EXIT_SUCCESS;

pub async fn run(args: PackArgs) -> Result<i32> {
    let defaults = profile_defaults(&args)?;
    let source = build_source(&args, defaults.as_ref())?;
    let output_dir = args
        .output
        .clone()
        .or_else(|| {
            defaults
                .as_ref()
                .and_then(|p| p.output_dir.as_deref())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("."));

    if args.insecure {
        warn!("TLS certificate verification disabled");
    }
    let git = SystemGit::new(GitOptions {
        insecure_tls: args.insecure,
    });

    let client = match &source {
        PackSource::GitLab { config, .. } if args.with_artifacts => {
            Some(GitLabClient::new(config.clone())?)
        }
        _ => None,
    };
    let artifacts = client.as_ref().map(GitLabArtifacts::new);

    let mut builder = Builder::new(&git);
    if let Some(harvester) = &artifacts {
        builder = builder.with_artifact_source(harvester);
    }

    let options = PackOptions {
        output_dir,
        repo_name: args.repo_name.clone(),
        with_submodules: args.with_submodules,
        with_artifacts: args.with_artifacts,
        artifacts_ref: args.artifacts_ref.clone(),
    };
    let outcome = builder.pack(&source, &options).await?;

    for warning in &outcome.warnings {
        eprintln!("warning: {}", warning);
    }
    let manifest = &outcome.manifest;
    eprintln!(
        "Packed {} (submodules: {}, artifacts: {})",
        manifest.repo_name,
        manifest.submodules.len(),
        manifest.artifacts.len()
    );
    println!("{}", outcome.archive.display());
    Ok(EXIT_SUCCESS)
}

/// Profile defaults are only loaded when some value is missing or a profile was named.
fn profile_defaults(args: &PackArgs) -> Result<Option<Profile>> {
    let complete = args.output.is_some()
        && (args.repo_url.is_some() || args.source_gitlab_url.is_some());
    if complete && args.profile.is_none() {
        return Ok(None);
    }
    let store = open_store(&args.config)?;
    Ok(Some(select_profile(&store, args.profile.as_deref())?))
}

fn build_source(args: &PackArgs, defaults: Option<&Profile>) -> Result<PackSource> {
    if let Some(url) = &args.repo_url {
        return Ok(PackSource::Url(url.clone()));
    }

    let repo_path = args.repo_path.clone().ok_or_else(|| PackError::InvalidSource {
        message: "pass --repo-url, or --repo-path with a GitLab URL".into(),
    })?;
    let base_url = args
        .source_gitlab_url
        .clone()
        .or_else(|| defaults.and_then(|p| p.gitlab_url.clone()))
        .ok_or_else(|| PackError::InvalidSource {
            message: "no GitLab URL: pass --source-gitlab-url or set gitlab_url on the profile"
                .into(),
        })?;

    let mut config = GitLabConfig::new(base_url).with_insecure_tls(args.insecure);
    if let Some(user) = &args.source_username {
        config = config.with_username(user.clone());
    }
    if let Some(password) = &args.source_password {
        config = config.with_password(password.clone());
    }
    if let Some(token) = &args.source_token {
        config = config.with_token(token.clone());
    }
    Ok(PackSource::GitLab { config, repo_path })
}
