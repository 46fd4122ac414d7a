//! Release operations for SystemGit (status, tagging, rollback, remotes)

use super::system_git::SystemGit;
use super::{RemoteStatus, VersionControl};
use crate::core::error::{GitError, RolloutError, RolloutResult};
use std::path::Path;

impl VersionControl for SystemGit {
  fn status(&self) -> RolloutResult<Vec<String>> {
    let stdout = self.run(&["status", "--porcelain"])?;
    Ok(
      stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect(),
    )
  }

  fn remote_status(&self) -> RolloutResult<RemoteStatus> {
    let branch = self.current_branch()?;

    // No upstream configured is reported, not raised
    let upstream = self
      .run(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
      .ok()
      .filter(|u| !u.is_empty());

    let (ahead, behind) = match upstream {
      Some(_) => parse_left_right(&self.run(&["rev-list", "--left-right", "--count", "HEAD...@{u}"])?)?,
      None => (0, 0),
    };

    Ok(RemoteStatus {
      branch,
      upstream,
      ahead,
      behind,
    })
  }

  fn current_branch(&self) -> RolloutResult<String> {
    self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
  }

  fn add_file(&self, path: &Path) -> RolloutResult<()> {
    let path = path.to_string_lossy();
    self.run(&["add", "--", path.as_ref()])?;
    Ok(())
  }

  fn commit(&self, message: &str) -> RolloutResult<()> {
    self.run(&["commit", "-m", message])?;
    Ok(())
  }

  fn create_tag(&self, name: &str) -> RolloutResult<()> {
    // Annotated so `push --follow-tags` picks it up
    self.run(&["tag", "-a", name, "-m", name])?;
    Ok(())
  }

  fn delete_tag(&self, name: &str) -> RolloutResult<()> {
    self.run(&["tag", "-d", name])?;
    Ok(())
  }

  fn delete_last_commit(&self) -> RolloutResult<()> {
    self.run(&["reset", "--hard", "HEAD~1"])?;
    Ok(())
  }

  fn push_with_tags(&self) -> RolloutResult<()> {
    let branch = self.current_branch()?;
    println!("   Pushing to remote '{}'...", self.remote);

    match self.run(&["push", "--follow-tags", "--no-verify", self.remote.as_str(), branch.as_str()]) {
      Ok(_) => {
        println!("   ✅ Pushed to {}/{}", self.remote, branch);
        Ok(())
      }
      Err(RolloutError::Git(GitError::CommandFailed { stderr, .. })) => Err(RolloutError::Git(GitError::PushFailed {
        remote: self.remote.clone(),
        branch,
        reason: stderr,
      })),
      Err(err) => Err(err),
    }
  }

  fn remote_url(&self) -> RolloutResult<Option<String>> {
    let remotes = self.list_remotes()?;
    Ok(
      remotes
        .into_iter()
        .find(|(name, _)| name == &self.remote)
        .map(|(_, url)| url),
    )
  }
}

impl SystemGit {
  /// List all remotes as (name, fetch url)
  pub fn list_remotes(&self) -> RolloutResult<Vec<(String, String)>> {
    let stdout = self.run(&["remote", "-v"])?;
    let mut remotes = Vec::new();

    for line in stdout.lines() {
      // Format: "origin  git@github.com:user/repo.git (fetch)"
      let parts: Vec<&str> = line.split_whitespace().collect();
      if parts.len() >= 2 && line.contains("(fetch)") {
        remotes.push((parts[0].to_string(), parts[1].to_string()));
      }
    }

    Ok(remotes)
  }
}

/// Parse `git rev-list --left-right --count` output ("<ahead>\t<behind>")
fn parse_left_right(output: &str) -> RolloutResult<(u32, u32)> {
  let mut parts = output.split_whitespace();
  let ahead = parts.next().and_then(|s| s.parse().ok());
  let behind = parts.next().and_then(|s| s.parse().ok());

  match (ahead, behind) {
    (Some(ahead), Some(behind)) => Ok((ahead, behind)),
    _ => Err(RolloutError::message(format!(
      "Unexpected output from git rev-list --left-right --count: '{}'",
      output
    ))),
  }
}
