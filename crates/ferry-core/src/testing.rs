//! In-process git double for unit tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::git::{GitError, GitResult, GitRunner};

/// Records every invocation; `clone` creates its destination directory.
#[derive(Default)]
pub struct FakeGit {
    calls: Mutex<Vec<String>>,
    failures: Vec<(String, String)>,
    gitmodules: Option<String>,
}

impl FakeGit {
    /// Fail any command whose joined arguments contain `pattern`.
    pub fn fail_on(mut self, pattern: &str, stderr: &str) -> Self {
        self.failures.push((pattern.to_string(), stderr.to_string()));
        self
    }

    /// Content written to `.gitmodules` of worktree clones.
    pub fn with_gitmodules(mut self, text: &str) -> Self {
        self.gitmodules = Some(text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, pattern: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains(pattern))
            .collect()
    }
}

#[async_trait]
impl GitRunner for FakeGit {
    async fn run(&self, args: &[String], _cwd: Option<&Path>) -> GitResult<String> {
        let joined = args.join(" ");
        self.calls.lock().unwrap().push(joined.clone());

        if let Some((_, stderr)) = self.failures.iter().find(|(p, _)| joined.contains(p.as_str())) {
            return Err(GitError::failed(args, "exit status: 1", stderr));
        }

        match args.first().map(String::as_str) {
            Some("--version") => Ok("git version 2.43.0\n".to_string()),
            Some("clone") => {
                let dest = PathBuf::from(args.last().unwrap());
                std::fs::create_dir_all(&dest).unwrap();
                if args.iter().any(|a| a == "--mirror") {
                    std::fs::write(dest.join("HEAD"), "ref: refs/heads/main\n").unwrap();
                } else if let Some(text) = &self.gitmodules {
                    std::fs::write(dest.join(".gitmodules"), text).unwrap();
                }
                Ok(String::new())
            }
            _ => Ok(String::new()),
        }
    }
}
