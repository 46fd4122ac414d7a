//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// An npm package in a git repo with a bare `origin` remote and a fake
/// registry client that logs its arguments instead of talking to a registry.
///
/// Layout under the temp root: `pkg/` (the repo), `remote.git/`, `bin/`.
pub struct TestPackage {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
  bin: PathBuf,
}

impl TestPackage {
  /// Create a package at `version` on `master`, pushed and tracking origin
  pub fn new(version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("pkg");
    let remote = root.path().join("remote.git");
    let bin = root.path().join("bin");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&bin)?;

    git(root.path(), &["init", "--bare", "--initial-branch=master", "remote.git"])?;
    git(&path, &["init", "--initial-branch=master"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["remote", "add", "origin", &remote.to_string_lossy()])?;

    let npm = write_fake_npm(&bin)?;

    std::fs::write(
      path.join("package.json"),
      format!(
        r#"{{
  "name": "widget",
  "version": "{}",
  "main": "index.js",
  "scripts": {{
    "test": "node test.js"
  }}
}}
"#,
        version
      ),
    )?;
    std::fs::write(path.join("index.js"), "module.exports = 42;\n")?;
    std::fs::write(path.join("rollout.toml"), format!("npm_client = \"{}\"\n", npm.display()))?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;
    git(&path, &["push", "-u", "origin", "master"])?;

    Ok(Self {
      _root: root,
      path,
      remote,
      bin,
    })
  }

  /// Make the fake client fail `publish`
  pub fn fail_publish(&self) -> Result<()> {
    std::fs::write(self.bin.join("fail-publish"), "")?;
    Ok(())
  }

  /// Argument lines the fake client was invoked with
  pub fn npm_calls(&self) -> Result<Vec<String>> {
    let log = self.bin.join("npm.log");
    if !log.exists() {
      return Ok(Vec::new());
    }
    Ok(std::fs::read_to_string(log)?.lines().map(String::from).collect())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Get git log
  pub fn git_log(&self, n: usize) -> Result<Vec<String>> {
    let output = git(&self.path, &["log", &format!("-{}", n), "--format=%s"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Local tags
  pub fn tags(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Tags present on the bare remote
  pub fn remote_tags(&self) -> Result<Vec<String>> {
    let output = git(&self.remote, &["tag", "--list"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Write a file
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }

  /// Current manifest version
  pub fn version(&self) -> Result<String> {
    let manifest: serde_json::Value = serde_json::from_str(&self.read_file("package.json")?)?;
    manifest["version"]
      .as_str()
      .map(String::from)
      .context("package.json has no version")
  }
}

/// Shell script standing in for npm: appends its arguments to `npm.log`
/// and fails `publish` while a `fail-publish` marker exists
fn write_fake_npm(bin: &Path) -> Result<PathBuf> {
  let script = bin.join("fake-npm");
  std::fs::write(
    &script,
    r#"#!/bin/sh
dir="$(dirname "$0")"
echo "$*" >> "$dir/npm.log"
if [ "$1" = "publish" ] && [ -f "$dir/fail-publish" ]; then
  echo "npm ERR! 403 Forbidden" >&2
  exit 1
fi
exit 0
"#,
  )?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
  }

  Ok(script)
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the rollout binary, returning its output whatever the exit status
pub fn run_rollout(cwd: &Path, args: &[&str]) -> Result<Output> {
  let rollout_bin = env!("CARGO_BIN_EXE_rollout");

  Command::new(rollout_bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run rollout")
}

/// Run the rollout binary and require success
pub fn run_rollout_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_rollout(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "rollout command failed: rollout {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
