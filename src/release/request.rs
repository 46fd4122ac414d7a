//! Immutable description of one release run

use crate::core::config::{DEFAULT_ALLOW_BRANCH, RolloutConfig};
use crate::release::version::VersionChoice;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
  /// Positional version argument (keyword or literal)
  pub next_version: Option<String>,
  pub preid: Option<String>,
  /// Select the prerelease increment without a positional argument
  pub prerelease: bool,
  pub npm_tag: Option<String>,
  pub allow_branch: Vec<String>,
  pub skip_checks: bool,
  pub skip_git: bool,
  pub skip_npm: bool,
  pub skip_version: bool,
  pub publish_dir: Option<PathBuf>,
  /// Access override: Some(true) = public, Some(false) = restricted
  pub public: Option<bool>,
}

impl Default for ReleaseRequest {
  fn default() -> Self {
    Self {
      next_version: None,
      preid: None,
      prerelease: false,
      npm_tag: None,
      allow_branch: vec![DEFAULT_ALLOW_BRANCH.to_string()],
      skip_checks: false,
      skip_git: false,
      skip_npm: false,
      skip_version: false,
      publish_dir: None,
      public: None,
    }
  }
}

impl ReleaseRequest {
  /// Request seeded from configuration; command-line values are applied on top
  pub fn from_config(config: &RolloutConfig) -> Self {
    let defaults = Self::default();
    Self {
      next_version: None,
      preid: config.preid.clone(),
      prerelease: false,
      npm_tag: config.npm_tag.clone(),
      allow_branch: config.allow_branch.clone().unwrap_or(defaults.allow_branch),
      skip_checks: config.skip_checks,
      skip_git: config.skip_git,
      skip_npm: config.skip_npm,
      skip_version: config.skip_version,
      publish_dir: config.publish_dir.clone(),
      public: config.public,
    }
  }

  /// Version choice implied by the arguments, or None when the operator must pick
  pub fn version_choice(&self) -> Option<VersionChoice> {
    if let Some(arg) = &self.next_version {
      return Some(VersionChoice::from_arg(arg, self.preid.as_deref()));
    }
    if self.prerelease {
      return Some(VersionChoice::Prerelease(self.preid.clone()));
    }
    None
  }
}
