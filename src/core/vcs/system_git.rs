//! System git backend
//!
//! Every operation is a single `git` subprocess run from the package root with
//! an isolated environment. Output is captured; stderr becomes part of the
//! error on failure.

use crate::core::error::{GitError, RolloutResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variables forwarded to git (everything else is cleared)
const FORWARDED_ENV: &[&str] = &["PATH", "HOME", "SSH_AUTH_SOCK", "GIT_SSH_COMMAND"];

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Remote compared against and pushed to
  pub(crate) remote: String,
}

impl SystemGit {
  /// Create a backend rooted at `path`.
  ///
  /// Nothing is executed here; a missing repository surfaces as
  /// `GitError::RepoNotFound` from the first command.
  pub fn new(path: &Path, remote: impl Into<String>) -> Self {
    Self {
      repo_path: path.to_path_buf(),
      remote: remote.into(),
    }
  }

  /// Run git and return trimmed stdout, mapping failures to `GitError`
  pub(crate) fn run(&self, args: &[&str]) -> RolloutResult<String> {
    let command = format!("git {}", args.join(" "));
    tracing::debug!(%command, cwd = %self.repo_path.display(), "running git");

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
      if stderr.contains("not a git repository") {
        return Err(
          GitError::RepoNotFound {
            path: self.repo_path.clone(),
          }
          .into(),
        );
      }
      return Err(GitError::CommandFailed { command, stderr }.into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists PATH, HOME and the SSH agent variables
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    for key in FORWARDED_ENV {
      if let Ok(value) = std::env::var(key) {
        cmd.env(key, value);
      }
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
