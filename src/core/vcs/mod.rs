pub mod system_git;
mod system_git_ops;

use crate::core::error::RolloutResult;
use std::path::Path;

pub use system_git::SystemGit;

/// How the current branch relates to its upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStatus {
  pub branch: String,
  /// Upstream ref (e.g. "origin/master"), None when not tracking
  pub upstream: Option<String>,
  pub ahead: u32,
  pub behind: u32,
}

impl RemoteStatus {
  pub fn matches(&self) -> bool {
    self.upstream.is_some() && self.ahead == 0 && self.behind == 0
  }
}

/// Version-control command surface used by a release
///
/// Queries are read-only; the remaining methods mutate the local repository
/// (or the remote, for `push_with_tags`).
pub trait VersionControl {
  /// Porcelain status lines for uncommitted changes (empty when clean)
  fn status(&self) -> RolloutResult<Vec<String>>;

  /// Compare the current branch with its upstream
  fn remote_status(&self) -> RolloutResult<RemoteStatus>;

  fn current_branch(&self) -> RolloutResult<String>;

  fn add_file(&self, path: &Path) -> RolloutResult<()>;

  fn commit(&self, message: &str) -> RolloutResult<()>;

  fn create_tag(&self, name: &str) -> RolloutResult<()>;

  fn delete_tag(&self, name: &str) -> RolloutResult<()>;

  /// Drop HEAD and reset the working tree to its parent
  fn delete_last_commit(&self) -> RolloutResult<()>;

  /// Push the current branch and its tags
  fn push_with_tags(&self) -> RolloutResult<()>;

  /// URL of the configured remote, if any
  fn remote_url(&self) -> RolloutResult<Option<String>>;
}
