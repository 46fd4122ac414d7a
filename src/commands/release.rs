//! Release command implementation
//!
//! Loads package.json and configuration from the current directory, merges
//! them with the command-line flags and runs the release pipeline.

use crate::core::config::{AssumeAnswer, RolloutConfig};
use crate::core::context::{MANIFEST_FILE, RunContext};
use crate::core::error::RolloutResult;
use crate::release::{PackageManifest, ReleaseOutcome, ReleasePipeline, ReleaseRequest};
use crate::ui::prompt::{AssumePrompter, Prompter, TerminalPrompter};
use clap::Args;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Args)]
pub struct ReleaseArgs {
  /// Next version: patch, minor, major, prepatch, preminor, premajor, prerelease or a semver literal
  pub next_version: Option<String>,

  /// Prerelease identifier (e.g. beta, rc)
  #[arg(long)]
  pub preid: Option<String>,

  /// Bump the prerelease number instead of asking
  #[arg(long)]
  pub prerelease: bool,

  /// Publish from this directory instead of the package root
  #[arg(long, value_name = "DIR")]
  pub publish_dir: Option<PathBuf>,

  /// Branch allowed to publish from (repeatable) [default: master]
  #[arg(long, value_name = "BRANCH")]
  pub allow_branch: Vec<String>,

  /// Registry distribution tag
  #[arg(long, value_name = "TAG")]
  pub npm_tag: Option<String>,

  /// Skip version bumping and publish the current version
  #[arg(long)]
  pub skip_version: bool,

  /// Skip running the test script
  #[arg(long)]
  pub skip_checks: bool,

  /// Skip git checks, committing, tagging and pushing
  #[arg(long)]
  pub skip_git: bool,

  /// Stop before publishing to the registry
  #[arg(long)]
  pub skip_npm: bool,

  /// Publish with public access
  #[arg(long, conflicts_with = "restricted")]
  pub public: bool,

  /// Publish with restricted access
  #[arg(long)]
  pub restricted: bool,

  /// Answer yes to every confirmation
  #[arg(short = 'y', long)]
  pub yes: bool,
}

impl ReleaseArgs {
  /// Apply command-line values on top of configuration
  pub fn to_request(&self, config: &RolloutConfig) -> ReleaseRequest {
    let mut request = ReleaseRequest::from_config(config);

    request.next_version = self.next_version.clone();
    request.prerelease = self.prerelease;
    if let Some(preid) = &self.preid {
      request.preid = Some(preid.clone());
    }
    if let Some(dir) = &self.publish_dir {
      request.publish_dir = Some(dir.clone());
    }
    if !self.allow_branch.is_empty() {
      request.allow_branch = self.allow_branch.clone();
    }
    if let Some(tag) = &self.npm_tag {
      request.npm_tag = Some(tag.clone());
    }
    request.skip_version |= self.skip_version;
    request.skip_checks |= self.skip_checks;
    request.skip_git |= self.skip_git;
    request.skip_npm |= self.skip_npm;
    if self.public {
      request.public = Some(true);
    } else if self.restricted {
      request.public = Some(false);
    }

    request
  }
}

/// Pick the prompter: `--yes` wins, then the configured `assume` policy
fn select_prompter(yes: bool, config: &RolloutConfig) -> RolloutResult<Box<dyn Prompter>> {
  if yes {
    return Ok(Box::new(AssumePrompter::new(true)));
  }
  let prompter: Box<dyn Prompter> = match config.assume_answer()? {
    Some(AssumeAnswer::Yes) => Box::new(AssumePrompter::new(true)),
    Some(AssumeAnswer::No) => Box::new(AssumePrompter::new(false)),
    None => Box::new(TerminalPrompter),
  };
  Ok(prompter)
}

/// Run the release command
pub fn run_release(args: ReleaseArgs) -> RolloutResult<()> {
  let root = env::current_dir()?;

  let manifest = PackageManifest::load(&root.join(MANIFEST_FILE))?;
  let config = RolloutConfig::load(&root, &manifest.raw())?;
  let request = args.to_request(&config);
  tracing::debug!(?request, "release request");

  let prompter = select_prompter(args.yes, &config)?;
  let ctx = RunContext::build(&root, &config, prompter);

  let mut pipeline = ReleasePipeline::new(&ctx, &request, &manifest);
  match pipeline.run()? {
    ReleaseOutcome::Published {
      version,
      dist_tag,
      url,
    } => {
      println!();
      println!(
        "🎉 Published v{}@{}: {}",
        version,
        dist_tag,
        url.unwrap_or_else(|| "(no remote configured)".to_string())
      );
      println!();
    }
    ReleaseOutcome::Declined => println!("Release cancelled"),
  }

  Ok(())
}
