//! Git capability.
//!
//! Everything ferry does with repositories goes through [`GitRunner`]: a
//! parameter list plus an optional working directory in, stdout or a failure
//! carrying stderr out. [`SystemGit`] shells out to the `git` binary; tests
//! substitute a fake.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, instrument};

use ferry_bundle::redact_credentials;

static USERINFO: Lazy<Regex> = Lazy::new(|| {
    // scheme://user[:pass]@ in free text, up to the last `@` before the path
    Regex::new(r"(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*://)[^/\s']+@").expect("static regex")
});

/// Remove `user:pass@` from every URL embedded in `text`.
pub fn redact_text(text: &str) -> String {
    USERINFO.replace_all(text, "$scheme").into_owned()
}

/// Per-invocation git settings. Passed explicitly; never process-global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GitOptions {
    /// Adds `-c http.sslVerify=false` to every command.
    pub insecure_tls: bool,
}

/// Git command failure. Messages never carry credentials.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

impl GitError {
    pub fn failed(args: &[String], status: impl ToString, stderr: &str) -> Self {
        Self::Failed {
            command: display_args(args),
            status: status.to_string(),
            stderr: redact_text(stderr.trim()),
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            Self::Failed { stderr, .. } => stderr,
            Self::Spawn { .. } => "",
        }
    }
}

pub type GitResult<T> = Result<T, GitError>;

/// `args` joined for messages, with credentials stripped.
pub fn display_args(args: &[String]) -> String {
    args.iter()
        .map(|a| redact_credentials(a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs git commands.
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` in `cwd` (or the current directory); return stdout.
    async fn run(&self, args: &[String], cwd: Option<&Path>) -> GitResult<String>;
}

/// [`GitRunner`] backed by the system `git` binary.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    options: GitOptions,
}

impl SystemGit {
    pub fn new(options: GitOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    #[instrument(skip_all, fields(command = %display_args(args)))]
    async fn run(&self, args: &[String], cwd: Option<&Path>) -> GitResult<String> {
        let mut cmd = Command::new("git");
        if self.options.insecure_tls {
            cmd.arg("-c").arg("http.sslVerify=false");
        }
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!("spawning git");
        let output = cmd
            .output()
            .await
            .map_err(|source| GitError::Spawn { source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::failed(args, output.status, &stderr));
        }

        debug!("git succeeded");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn strings<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// `git --version`, trimmed.
pub async fn git_version(git: &dyn GitRunner) -> GitResult<String> {
    Ok(git.run(&strings(["--version"]), None).await?.trim().to_string())
}

/// `git clone --mirror <url> <dest>`
pub async fn clone_mirror(git: &dyn GitRunner, url: &str, dest: &Path) -> GitResult<()> {
    let dest = dest.to_string_lossy();
    git.run(&strings(["clone", "--mirror", url, &dest]), None)
        .await
        .map(|_| ())
}

/// `git clone --recursive --depth 1 <url> <dest>`
pub async fn clone_shallow_worktree(git: &dyn GitRunner, url: &str, dest: &Path) -> GitResult<()> {
    let dest = dest.to_string_lossy();
    git.run(
        &strings(["clone", "--recursive", "--depth", "1", url, &dest]),
        None,
    )
    .await
    .map(|_| ())
}

/// Point remote `target` of the bare repo at `remote_url` and `push --mirror --force`.
///
/// A stale `target` remote is removed first; failure to remove it is ignored.
pub async fn push_mirror(git: &dyn GitRunner, repo_dir: &Path, remote_url: &str) -> GitResult<()> {
    let dir = repo_dir.to_string_lossy();

    if let Err(e) = git
        .run(&strings(["--git-dir", &dir, "remote", "remove", "target"]), None)
        .await
    {
        debug!(error = %e, "no stale target remote");
    }
    git.run(
        &strings(["--git-dir", &dir, "remote", "add", "target", remote_url]),
        None,
    )
    .await?;
    git.run(
        &strings(["--git-dir", &dir, "push", "--mirror", "--force", "target"]),
        None,
    )
    .await
    .map(|_| ())
}
