use crate::core::error::{ConfigError, RolloutError, RolloutResult, ResultExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for rollout
/// Searched in order: rollout.toml, .rollout.toml, .config/rollout.toml,
/// then the "release" key of package.json
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
  /// Branches a release may be cut from (default: ["master"])
  #[serde(alias = "allowBranch", alias = "allow-branch")]
  pub allow_branch: Option<Vec<String>>,

  /// Registry distribution tag override
  #[serde(alias = "npmTag", alias = "npm-tag")]
  pub npm_tag: Option<String>,

  /// Prerelease identifier (e.g. "beta", "rc")
  pub preid: Option<String>,

  /// Publish from this directory instead of the package root
  #[serde(alias = "publishDir", alias = "publish-dir")]
  pub publish_dir: Option<PathBuf>,

  /// Access override: true = public, false = restricted
  pub public: Option<bool>,

  #[serde(alias = "skipChecks", alias = "skip-checks")]
  pub skip_checks: bool,

  #[serde(alias = "skipGit", alias = "skip-git")]
  pub skip_git: bool,

  #[serde(alias = "skipNpm", alias = "skip-npm")]
  pub skip_npm: bool,

  #[serde(alias = "skipVersion", alias = "skip-version")]
  pub skip_version: bool,

  /// Answer for confirmations when nobody is at the terminal ("yes" or "no")
  pub assume: Option<String>,

  /// Git remote to compare against and push to (default: "origin")
  pub remote: Option<String>,

  /// Registry client executable (default: "npm")
  #[serde(alias = "npmClient", alias = "npm-client")]
  pub npm_client: Option<String>,
}

/// Non-interactive answer policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssumeAnswer {
  Yes,
  No,
}

pub const DEFAULT_ALLOW_BRANCH: &str = "master";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_NPM_CLIENT: &str = "npm";

impl RolloutConfig {
  /// Find config file in search order: rollout.toml, .rollout.toml, .config/rollout.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("rollout.toml"),
      path.join(".rollout.toml"),
      path.join(".config").join("rollout.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config for a package root.
  ///
  /// A config file wins over the package.json "release" key; with neither
  /// present the defaults apply.
  pub fn load(path: &Path, package_json: &serde_json::Value) -> RolloutResult<Self> {
    let config = if let Some(config_path) = Self::find_config_path(path) {
      let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
      let config: RolloutConfig = toml_edit::de::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;
      tracing::debug!(path = %config_path.display(), "loaded config file");
      config
    } else {
      Self::from_package_json(package_json)?
    };

    config.validate()?;
    Ok(config)
  }

  /// Read the "release" key of package.json, if any
  pub fn from_package_json(package_json: &serde_json::Value) -> RolloutResult<Self> {
    match package_json.get("release") {
      Some(value) => serde_json::from_value(value.clone()).context("Failed to parse \"release\" config in package.json"),
      None => Ok(Self::default()),
    }
  }

  /// Validate configured values
  pub fn validate(&self) -> RolloutResult<()> {
    if let Some(branches) = &self.allow_branch
      && (branches.is_empty() || branches.iter().any(|b| b.trim().is_empty()))
    {
      return Err(RolloutError::Config(ConfigError::InvalidValue {
        field: "allow_branch".to_string(),
        reason: "must list at least one non-empty branch name".to_string(),
      }));
    }

    if let Some(remote) = &self.remote
      && remote.trim().is_empty()
    {
      return Err(RolloutError::Config(ConfigError::InvalidValue {
        field: "remote".to_string(),
        reason: "must not be empty".to_string(),
      }));
    }

    self.assume_answer()?;
    Ok(())
  }

  /// Parsed `assume` policy
  pub fn assume_answer(&self) -> RolloutResult<Option<AssumeAnswer>> {
    match self.assume.as_deref().map(str::to_ascii_lowercase).as_deref() {
      None => Ok(None),
      Some("yes") | Some("y") | Some("true") => Ok(Some(AssumeAnswer::Yes)),
      Some("no") | Some("n") | Some("false") => Ok(Some(AssumeAnswer::No)),
      Some(other) => Err(RolloutError::Config(ConfigError::InvalidValue {
        field: "assume".to_string(),
        reason: format!("expected \"yes\" or \"no\", got \"{}\"", other),
      })),
    }
  }

  /// Remote name, falling back to "origin"
  pub fn remote_name(&self) -> &str {
    self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
  }

  /// Registry client executable, falling back to "npm"
  pub fn npm_client(&self) -> &str {
    self.npm_client.as_deref().unwrap_or(DEFAULT_NPM_CLIENT)
  }
}
