//! Integration tests for `rollout release`

use crate::helpers::{TestPackage, git, run_rollout, run_rollout_ok};
use anyhow::Result;

#[test]
fn test_release_minor_publishes_tags_and_pushes() -> Result<()> {
  let pkg = TestPackage::new("2.0.0")?;

  let output = run_rollout_ok(&pkg.path, &["release", "minor", "--yes"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Published v2.1.0@latest: https://npm.im/widget"), "stdout: {}", stdout);
  assert_eq!(pkg.version()?, "2.1.0");
  assert_eq!(pkg.git_log(1)?, vec!["Publish v2.1.0"]);
  assert_eq!(pkg.tags()?, vec!["v2.1.0"]);
  assert_eq!(pkg.remote_tags()?, vec!["v2.1.0"]);
  assert_eq!(pkg.npm_calls()?, vec!["test", "publish"]);

  // Working tree stays clean and in sync after the push
  let status = git(&pkg.path, &["status", "--porcelain"])?;
  assert!(String::from_utf8_lossy(&status.stdout).trim().is_empty());

  Ok(())
}

#[test]
fn test_release_prerelease_uses_next_tag() -> Result<()> {
  let pkg = TestPackage::new("1.0.0")?;

  let output = run_rollout_ok(&pkg.path, &["release", "prerelease", "--preid", "rc", "--yes"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Published v1.0.1-rc.0@next"), "stdout: {}", stdout);
  assert_eq!(pkg.version()?, "1.0.1-rc.0");
  assert_eq!(pkg.npm_calls()?, vec!["test", "publish --tag next"]);

  Ok(())
}

#[test]
fn test_publish_failure_rolls_back_git() -> Result<()> {
  let pkg = TestPackage::new("1.2.3")?;
  pkg.fail_publish()?;

  let output = run_rollout(&pkg.path, &["release", "patch", "--yes"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr);
  assert!(stderr.contains("publish"), "stderr: {}", stderr);
  assert_eq!(pkg.version()?, "1.2.3");
  assert_eq!(pkg.git_log(1)?, vec!["Initial commit"]);
  assert!(pkg.tags()?.is_empty());
  assert!(pkg.remote_tags()?.is_empty());

  Ok(())
}

#[test]
fn test_disallowed_branch_is_rejected() -> Result<()> {
  let pkg = TestPackage::new("1.2.3")?;
  git(&pkg.path, &["checkout", "-b", "feature/x"])?;
  git(&pkg.path, &["push", "-u", "origin", "feature/x"])?;

  let output = run_rollout(&pkg.path, &["release", "patch", "--yes"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr);
  assert!(stderr.contains("Cannot publish from branch: feature/x"), "stderr: {}", stderr);
  assert_eq!(pkg.version()?, "1.2.3");
  assert!(pkg.npm_calls()?.is_empty());

  // The same branch passes once allowed
  run_rollout_ok(
    &pkg.path,
    &["release", "patch", "--yes", "--allow-branch", "feature/x"],
  )?;
  assert_eq!(pkg.version()?, "1.2.4");

  Ok(())
}

#[test]
fn test_dirty_tree_is_rejected() -> Result<()> {
  let pkg = TestPackage::new("1.2.3")?;
  pkg.write_file("index.js", "module.exports = 43;\n")?;

  let output = run_rollout(&pkg.path, &["release", "patch", "--yes"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr);
  assert!(stderr.contains("not clean"), "stderr: {}", stderr);
  assert!(pkg.npm_calls()?.is_empty());

  Ok(())
}

#[test]
fn test_skip_npm_reports_remote_url() -> Result<()> {
  let pkg = TestPackage::new("0.3.0")?;

  let output = run_rollout_ok(&pkg.path, &["release", "major", "--skip-npm", "--yes"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Published v1.0.0@latest"), "stdout: {}", stdout);
  assert!(stdout.contains("remote.git"), "stdout: {}", stdout);
  assert_eq!(pkg.npm_calls()?, vec!["test"]);
  assert_eq!(pkg.remote_tags()?, vec!["v1.0.0"]);

  Ok(())
}

#[test]
fn test_invalid_version_changes_nothing() -> Result<()> {
  let pkg = TestPackage::new("1.2.3")?;
  let before = pkg.read_file("package.json")?;

  let output = run_rollout(&pkg.path, &["release", "not-a-version", "--yes"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr);
  assert!(stderr.contains("not a valid semver version"), "stderr: {}", stderr);
  assert_eq!(pkg.read_file("package.json")?, before);
  assert!(pkg.tags()?.is_empty());

  Ok(())
}

#[test]
fn test_assume_no_declines_cleanly() -> Result<()> {
  let pkg = TestPackage::new("1.2.3")?;
  let config = pkg.read_file("rollout.toml")?;
  pkg.write_file("rollout.toml", &format!("{}assume = \"no\"\n", config))?;
  pkg.commit("Decline releases")?;
  git(&pkg.path, &["push"])?;

  let output = run_rollout_ok(&pkg.path, &["release", "patch"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Release cancelled"), "stdout: {}", stdout);
  assert_eq!(pkg.version()?, "1.2.3");
  assert!(pkg.tags()?.is_empty());
  assert_eq!(pkg.npm_calls()?, vec!["test"]);

  Ok(())
}

#[test]
fn test_skip_version_tags_existing_version() -> Result<()> {
  let pkg = TestPackage::new("4.5.6")?;

  run_rollout_ok(&pkg.path, &["release", "--skip-version", "--yes"])?;

  assert_eq!(pkg.version()?, "4.5.6");
  assert_eq!(pkg.git_log(1)?, vec!["Initial commit"]);
  assert_eq!(pkg.tags()?, vec!["v4.5.6"]);
  assert_eq!(pkg.npm_calls()?, vec!["test", "publish"]);

  Ok(())
}
