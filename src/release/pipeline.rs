//! Release state machine
//!
//! ```text
//! Idle → Checking → Versioning → Committing → Publishing → Pushing → Done
//!                                                  └──→ RollingBack → Failed
//! ```
//!
//! Stages run strictly in sequence. Nothing is mutated before `Committing`,
//! so every failure up to that point is a plain abort. A publish failure is the
//! only path into `RollingBack`, which runs at most once and never replaces the
//! publish error that caused it.

use crate::core::context::RunContext;
use crate::core::error::{RolloutError, RolloutResult, print_warning};
use crate::core::registry::LifecycleHooks;
use crate::release::gate::VersionControlGate;
use crate::release::guard::RepoStateGuard;
use crate::release::manifest::{ManifestWriter, PackageManifest};
use crate::release::publish::{RegistryPublisher, dist_tag};
use crate::release::request::ReleaseRequest;
use crate::release::version::{self, BumpKeyword, VersionChoice};
use semver::Version;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Idle,
  Checking,
  Versioning,
  Committing,
  Publishing,
  RollingBack,
  Pushing,
  Done,
  Failed,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::Idle => "idle",
      Stage::Checking => "checking",
      Stage::Versioning => "versioning",
      Stage::Committing => "committing",
      Stage::Publishing => "publishing",
      Stage::RollingBack => "rolling-back",
      Stage::Pushing => "pushing",
      Stage::Done => "done",
      Stage::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Mutable bookkeeping for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseState {
  pub stage: Stage,
  /// Every stage entered, in order
  pub history: Vec<Stage>,
  pub next_version: Option<Version>,
  pub git_tag: Option<String>,
  pub dist_tag: Option<String>,
  /// A release commit exists (RemoveLastCommit is meaningful)
  pub committed: bool,
  /// A release tag exists (rollback is meaningful)
  pub tagged: bool,
  pub published: bool,
  pub rolled_back: bool,
}

impl Default for ReleaseState {
  fn default() -> Self {
    Self {
      stage: Stage::Idle,
      history: Vec::new(),
      next_version: None,
      git_tag: None,
      dist_tag: None,
      committed: false,
      tagged: false,
      published: false,
      rolled_back: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
  Published {
    version: Version,
    dist_tag: String,
    /// Registry page, or the git remote when publishing was skipped
    url: Option<String>,
  },
  /// The operator declined the version confirmation; nothing was changed
  Declined,
}

pub struct ReleasePipeline<'a> {
  ctx: &'a RunContext,
  request: &'a ReleaseRequest,
  manifest: &'a PackageManifest,
  state: ReleaseState,
}

impl<'a> ReleasePipeline<'a> {
  pub fn new(ctx: &'a RunContext, request: &'a ReleaseRequest, manifest: &'a PackageManifest) -> Self {
    Self {
      ctx,
      request,
      manifest,
      state: ReleaseState::default(),
    }
  }

  pub fn state(&self) -> &ReleaseState {
    &self.state
  }

  pub fn run(&mut self) -> RolloutResult<ReleaseOutcome> {
    tracing::debug!(
      root = %self.ctx.root.display(),
      env = ?self.ctx.env,
      package = %self.manifest.name,
      "starting release"
    );
    let result = self.execute();
    if result.is_err() {
      self.transition(Stage::Failed);
    }
    result
  }

  fn execute(&mut self) -> RolloutResult<ReleaseOutcome> {
    self.check()?;

    let next = self.select_version()?;
    let tag = dist_tag(&next, self.request.npm_tag.as_deref());
    self.state.next_version = Some(next.clone());
    self.state.dist_tag = Some(tag.clone());

    let question = format!("Are you sure you want to publish version: {}@{}?", next, tag);
    if !self.ctx.prompter.confirm(&question)? {
      self.transition(Stage::Done);
      return Ok(ReleaseOutcome::Declined);
    }

    let git_tag = self.commit_and_tag(&next)?;

    if let Err(err) = self.publish(&tag) {
      self.roll_back(&git_tag);
      return Err(err);
    }

    self.push()?;
    let url = self.report_url()?;
    self.transition(Stage::Done);

    Ok(ReleaseOutcome::Published {
      version: next,
      dist_tag: tag,
      url,
    })
  }

  fn transition(&mut self, stage: Stage) {
    tracing::info!(from = %self.state.stage, to = %stage, "release stage");
    self.state.stage = stage;
    self.state.history.push(stage);
  }

  fn gate(&self) -> VersionControlGate<'a> {
    VersionControlGate::new(self.ctx.vcs.as_ref(), self.request.skip_git, self.request.skip_version)
  }

  fn check(&mut self) -> RolloutResult<()> {
    self.transition(Stage::Checking);
    println!("🔍 Checking repo and running tests...");

    let guard = RepoStateGuard::new(self.ctx.vcs.as_ref());
    if !self.request.skip_git {
      guard.assert_clean()?;
      guard.assert_matches_remote()?;
    }
    let branch = guard.current_branch()?;
    guard.assert_allowed_branch(&branch, &self.request.allow_branch)?;

    if !self.request.skip_checks {
      let hooks = LifecycleHooks::new(&self.manifest.scripts, self.ctx.registry.as_ref());
      if !hooks.test()? {
        print_warning("No \"test\" script in package.json, skipping tests");
      }
    }
    Ok(())
  }

  fn select_version(&mut self) -> RolloutResult<Version> {
    self.transition(Stage::Versioning);
    let current = version::parse_current(&self.manifest.version)?;

    if self.request.skip_version {
      print_warning(format!("Using existing version: {}", current));
      return Ok(current);
    }

    let choice = match self.request.version_choice() {
      Some(choice) => choice,
      None => self.prompt_for_choice(&current)?,
    };
    let next = version::resolve(&current, &choice, self.request.preid.as_deref())?;
    println!("📦 Next version: {} (was {})", next, current);
    Ok(next)
  }

  fn prompt_for_choice(&self, current: &Version) -> RolloutResult<VersionChoice> {
    let preid = self.request.preid.as_deref();
    let candidates = version::candidates(current, preid)?;

    let mut labels: Vec<String> = candidates
      .iter()
      .map(|(keyword, next)| format!("{} ({})", keyword.label(), next))
      .collect();
    labels.push("Prerelease".to_string());
    labels.push("Custom".to_string());

    let message = format!("Select a new version (currently {})", current);
    let selected = self.ctx.prompter.select_one(&message, &labels)?;

    if let Some(keyword) = BumpKeyword::ALL.get(selected) {
      return Ok(VersionChoice::BumpKeyword(*keyword));
    }
    if selected == BumpKeyword::ALL.len() {
      if let Some(id) = preid {
        return Ok(VersionChoice::Prerelease(Some(id.to_string())));
      }
      let existing = version::existing_identifier(current);
      let default_next = version::resolve(current, &VersionChoice::Prerelease(None), None)?;
      let question = format!(
        "Enter a prerelease identifier (default: {}, yielding {})",
        existing.as_deref().map(|id| format!("\"{}\"", id)).unwrap_or_else(|| "none".to_string()),
        default_next
      );
      let id = self.ctx.prompter.read_line(&question, existing.as_deref())?;
      let id = id.trim();
      return Ok(VersionChoice::Prerelease((!id.is_empty()).then(|| id.to_string())));
    }

    let custom = self.ctx.prompter.read_line("Enter a custom version", None)?;
    Ok(VersionChoice::Custom(custom.trim().to_string()))
  }

  fn commit_and_tag(&mut self, next: &Version) -> RolloutResult<String> {
    self.transition(Stage::Committing);
    let writer = ManifestWriter::new(&self.ctx.root, self.request.publish_dir.as_deref());

    if self.request.skip_version {
      writer.stage_publish_dir(self.manifest, next)?;
    } else {
      writer.bump_and_persist(self.manifest, next)?;
      println!("📝 Bumped version to {} (was {})", next, self.manifest.version);
    }

    let git_tag = format!("v{}", next);
    self.state.git_tag = Some(git_tag.clone());

    let gate = self.gate();
    let committed = gate.commit(&self.manifest.path, &format!("Publish {}", git_tag))?;
    self.state.committed = committed;
    let tagged = match gate.tag(&git_tag) {
      Ok(tagged) => tagged,
      Err(err) => {
        if committed {
          tracing::warn!(tag = %git_tag, "tagging failed after the release commit");
          print_warning(leftover_commit_warning(&git_tag));
        }
        return Err(err);
      }
    };
    self.state.tagged = tagged;
    if committed || tagged {
      println!("🏷️  Tagged {}", git_tag);
    }
    Ok(git_tag)
  }

  fn publish(&mut self, tag: &str) -> RolloutResult<()> {
    self.transition(Stage::Publishing);
    if self.request.skip_npm {
      println!("⏭️  Skipping publish");
      return Ok(());
    }
    println!("🚀 Publishing {}...", self.manifest.name);

    let publisher = RegistryPublisher::new(self.ctx.registry.as_ref(), &self.ctx.root);
    publisher.publish(
      self.manifest,
      tag,
      self.request.public,
      self.request.publish_dir.as_deref(),
    )?;
    self.state.published = true;
    Ok(())
  }

  /// Offer to undo the tag and commit after a failed publish.
  ///
  /// Problems while rolling back are reported, never returned.
  fn roll_back(&mut self, git_tag: &str) {
    if self.request.skip_git || !self.state.tagged || self.state.rolled_back {
      return;
    }
    self.transition(Stage::RollingBack);

    let question = "There was a problem publishing, do you want to rollback the git operations?";
    match self.ctx.prompter.confirm(question) {
      Ok(true) => {}
      Ok(false) => {
        println!("⚠️  Leaving tag {} in place", git_tag);
        return;
      }
      Err(err) => {
        report_rollback_failure(&err);
        return;
      }
    }
    self.state.rolled_back = true;
    println!("⏪ Rolling back git operations...");

    let gate = self.gate();
    if let Err(err) = gate.remove_tag(git_tag) {
      report_rollback_failure(&err);
    }
    if self.state.committed
      && let Err(err) = gate.remove_last_commit()
    {
      report_rollback_failure(&err);
    }
  }

  fn push(&mut self) -> RolloutResult<()> {
    if self.request.skip_git {
      return Ok(());
    }
    self.transition(Stage::Pushing);
    self.gate().push_with_tags()?;
    Ok(())
  }

  fn report_url(&self) -> RolloutResult<Option<String>> {
    if self.request.skip_npm {
      return self.gate().remote_url();
    }
    Ok(Some(format!("https://npm.im/{}", self.manifest.name)))
  }
}

fn leftover_commit_warning(git_tag: &str) -> String {
  format!(
    "Release commit \"Publish {}\" and the bumped package.json are still in place; \
     run `git reset --hard HEAD~1` to discard them",
    git_tag
  )
}

fn report_rollback_failure(err: &RolloutError) {
  tracing::warn!(error = %err, "rollback failed");
  print_warning(format!("Rollback failed: {}", err));
}
