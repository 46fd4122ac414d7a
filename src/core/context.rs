//! Run context - build once, pass everywhere
//!
//! `RunContext` carries everything a release touches outside of its own
//! state: the package root, the environment applied to child processes, and
//! the collaborators (prompter, version control, registry). main.rs builds it
//! with the system implementations; tests inject fakes through
//! `RunContext::with_backends`.

use crate::core::config::RolloutConfig;
use crate::core::registry::{NpmClient, PackageRegistry};
use crate::core::vcs::{SystemGit, VersionControl};
use crate::ui::prompt::Prompter;
use std::path::{Path, PathBuf};

/// Manifest file name at the package root
pub const MANIFEST_FILE: &str = "package.json";

pub struct RunContext {
  /// Package root directory (absolute path)
  pub root: PathBuf,

  /// Environment overrides applied to registry client processes
  pub env: Vec<(String, String)>,

  pub prompter: Box<dyn Prompter>,

  pub vcs: Box<dyn VersionControl>,

  pub registry: Box<dyn PackageRegistry>,
}

impl RunContext {
  /// Build a context backed by system git and the configured registry client
  pub fn build(root: &Path, config: &RolloutConfig, prompter: Box<dyn Prompter>) -> Self {
    let env = default_env();
    let vcs = Box::new(SystemGit::new(root, config.remote_name()));
    let registry = Box::new(NpmClient::new(config.npm_client(), root, env.clone()));

    Self {
      root: root.to_path_buf(),
      env,
      prompter,
      vcs,
      registry,
    }
  }

  /// Build a context around explicit collaborators
  #[cfg(test)]
  pub fn with_backends(
    root: &Path,
    prompter: Box<dyn Prompter>,
    vcs: Box<dyn VersionControl>,
    registry: Box<dyn PackageRegistry>,
  ) -> Self {
    Self {
      root: root.to_path_buf(),
      env: default_env(),
      prompter,
      vcs,
      registry,
    }
  }
}

fn default_env() -> Vec<(String, String)> {
  vec![("FORCE_COLOR".to_string(), "1".to_string())]
}
