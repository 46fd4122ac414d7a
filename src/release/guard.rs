//! Read-only repository checks run before anything is mutated

use crate::core::error::{PreconditionError, RolloutResult};
use crate::core::vcs::VersionControl;

pub struct RepoStateGuard<'a> {
  vcs: &'a dyn VersionControl,
}

impl<'a> RepoStateGuard<'a> {
  pub fn new(vcs: &'a dyn VersionControl) -> Self {
    Self { vcs }
  }

  /// Fail if the working tree has uncommitted changes
  pub fn assert_clean(&self) -> RolloutResult<()> {
    let changes = self.vcs.status()?;
    if !changes.is_empty() {
      return Err(PreconditionError::DirtyWorkingTree { changes }.into());
    }
    Ok(())
  }

  /// Fail if the current branch is not in sync with its upstream
  pub fn assert_matches_remote(&self) -> RolloutResult<()> {
    let status = self.vcs.remote_status()?;
    if status.upstream.is_none() {
      return Err(PreconditionError::NoUpstream { branch: status.branch }.into());
    }
    if !status.matches() {
      return Err(
        PreconditionError::RemoteMismatch {
          branch: status.branch,
          ahead: status.ahead,
          behind: status.behind,
        }
        .into(),
      );
    }
    Ok(())
  }

  pub fn current_branch(&self) -> RolloutResult<String> {
    self.vcs.current_branch()
  }

  pub fn assert_allowed_branch(&self, branch: &str, allow_list: &[String]) -> RolloutResult<()> {
    if !allow_list.iter().any(|allowed| allowed == branch) {
      return Err(
        PreconditionError::BranchNotAllowed {
          branch: branch.to_string(),
          allowed: allow_list.to_vec(),
        }
        .into(),
      );
    }
    Ok(())
  }
}
