//! Package registry client (npm-compatible command surface)
//!
//! The client is spawned with inherited stdout so test and publish output
//! streams to the operator; stderr is captured for error reports.

use crate::core::error::{PreconditionError, PublishError, RolloutResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Arguments for a single registry publish
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishArgs {
  /// Publish this directory instead of the package root
  pub directory: Option<PathBuf>,
  /// Distribution tag, only passed when it differs from "latest"
  pub tag: Option<String>,
  /// "public" or "restricted", only when explicitly overridden
  pub access: Option<String>,
}

impl PublishArgs {
  /// Command-line arguments after the client name
  pub fn to_args(&self) -> Vec<String> {
    let mut args = vec!["publish".to_string()];
    if let Some(dir) = &self.directory {
      args.push(dir.to_string_lossy().to_string());
    }
    if let Some(tag) = &self.tag {
      args.push("--tag".to_string());
      args.push(tag.clone());
    }
    if let Some(access) = &self.access {
      args.push("--access".to_string());
      args.push(access.clone());
    }
    args
  }
}

/// Registry command surface used by a release
pub trait PackageRegistry {
  /// Run the package's test script
  fn run_tests(&self) -> RolloutResult<()>;

  /// Run a named script from the package root
  fn run_script(&self, name: &str) -> RolloutResult<()>;

  fn publish(&self, args: &PublishArgs) -> RolloutResult<()>;
}

/// npm (or a compatible client) run as a subprocess
pub struct NpmClient {
  program: String,
  root: PathBuf,
  env: Vec<(String, String)>,
}

impl NpmClient {
  pub fn new(program: impl Into<String>, root: &Path, env: Vec<(String, String)>) -> Self {
    Self {
      program: program.into(),
      root: root.to_path_buf(),
      env,
    }
  }

  fn command(&self, args: &[String]) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd
      .current_dir(&self.root)
      .args(args)
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::piped());
    for (key, value) in &self.env {
      cmd.env(key, value);
    }
    cmd
  }

  fn run(&self, args: &[String]) -> Result<Output, PublishError> {
    let command_line = format!("{} {}", self.program, args.join(" "));
    tracing::debug!(command = %command_line, cwd = %self.root.display(), "running registry client");

    self.command(args).output().map_err(|e| PublishError::Spawn {
      command: command_line,
      reason: e.to_string(),
    })
  }
}

fn describe_failure(output: &Output) -> String {
  let stderr = String::from_utf8_lossy(&output.stderr);
  let stderr = stderr.trim();
  if stderr.is_empty() {
    output.status.to_string()
  } else {
    format!("{}\n{}", output.status, stderr)
  }
}

impl PackageRegistry for NpmClient {
  fn run_tests(&self) -> RolloutResult<()> {
    let output = self.run(&["test".to_string()]).map_err(|e| PreconditionError::TestsFailed {
      reason: e.to_string(),
    })?;
    if !output.status.success() {
      return Err(
        PreconditionError::TestsFailed {
          reason: describe_failure(&output),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn run_script(&self, name: &str) -> RolloutResult<()> {
    let output = self.run(&["run".to_string(), name.to_string()])?;
    if !output.status.success() {
      return Err(
        PublishError::LifecycleFailed {
          script: name.to_string(),
          status: describe_failure(&output),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn publish(&self, args: &PublishArgs) -> RolloutResult<()> {
    let argv = args.to_args();
    let output = self.run(&argv)?;
    if !output.status.success() {
      return Err(
        PublishError::CommandFailed {
          command: format!("{} {}", self.program, argv.join(" ")),
          status: describe_failure(&output),
        }
        .into(),
      );
    }
    Ok(())
  }
}

/// Lifecycle scripts declared in a manifest
///
/// Each method runs the script of the same name through the registry client
/// and returns whether it ran; an undeclared script is a no-op.
pub struct LifecycleHooks<'a> {
  scripts: &'a BTreeMap<String, String>,
  registry: &'a dyn PackageRegistry,
}

impl<'a> LifecycleHooks<'a> {
  pub fn new(scripts: &'a BTreeMap<String, String>, registry: &'a dyn PackageRegistry) -> Self {
    Self { scripts, registry }
  }

  pub fn has(&self, script: &str) -> bool {
    self.scripts.contains_key(script)
  }

  /// Test hook (`npm test`)
  pub fn test(&self) -> RolloutResult<bool> {
    if !self.has("test") {
      return Ok(false);
    }
    self.registry.run_tests()?;
    Ok(true)
  }

  pub fn prepublish(&self) -> RolloutResult<bool> {
    self.run("prepublish")
  }

  pub fn prepare(&self) -> RolloutResult<bool> {
    self.run("prepare")
  }

  pub fn prepublish_only(&self) -> RolloutResult<bool> {
    self.run("prepublishOnly")
  }

  pub fn publish(&self) -> RolloutResult<bool> {
    self.run("publish")
  }

  pub fn postpublish(&self) -> RolloutResult<bool> {
    self.run("postpublish")
  }

  fn run(&self, script: &str) -> RolloutResult<bool> {
    if !self.has(script) {
      tracing::debug!(script, "lifecycle script not declared, skipping");
      return Ok(false);
    }
    tracing::info!(script, "running lifecycle script");
    self.registry.run_script(script)?;
    Ok(true)
  }
}
