//! Commit, tag, push and their compensating inverses
//!
//! Mutations honor the skip flags: with `skip_git` nothing touches the
//! repository, with `skip_version` the commit is skipped but the tag is still
//! created on the existing HEAD. Each mutating method reports whether it acted.

use crate::core::error::RolloutResult;
use crate::core::vcs::VersionControl;
use std::path::Path;

pub struct VersionControlGate<'a> {
  vcs: &'a dyn VersionControl,
  skip_git: bool,
  skip_version: bool,
}

impl<'a> VersionControlGate<'a> {
  pub fn new(vcs: &'a dyn VersionControl, skip_git: bool, skip_version: bool) -> Self {
    Self {
      vcs,
      skip_git,
      skip_version,
    }
  }

  /// Stage the manifest and commit it
  pub fn commit(&self, manifest_path: &Path, message: &str) -> RolloutResult<bool> {
    if self.skip_git || self.skip_version {
      return Ok(false);
    }
    self.vcs.add_file(manifest_path)?;
    self.vcs.commit(message)?;
    tracing::info!(message, "release commit created");
    Ok(true)
  }

  pub fn tag(&self, name: &str) -> RolloutResult<bool> {
    if self.skip_git {
      return Ok(false);
    }
    self.vcs.create_tag(name)?;
    tracing::info!(tag = name, "release tag created");
    Ok(true)
  }

  pub fn remove_tag(&self, name: &str) -> RolloutResult<()> {
    tracing::info!(tag = name, "removing release tag");
    self.vcs.delete_tag(name)
  }

  pub fn remove_last_commit(&self) -> RolloutResult<()> {
    tracing::info!("removing release commit");
    self.vcs.delete_last_commit()
  }

  pub fn push_with_tags(&self) -> RolloutResult<bool> {
    if self.skip_git {
      return Ok(false);
    }
    self.vcs.push_with_tags()?;
    Ok(true)
  }

  pub fn remote_url(&self) -> RolloutResult<Option<String>> {
    self.vcs.remote_url()
  }
}
