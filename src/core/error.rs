//! Error types for rollout with contextual messages and exit codes
//!
//! Every failure the release pipeline can surface is categorized here so the
//! top level can pick an exit code and print a help line. Errors raised before
//! the commit stage are pure aborts; publish errors additionally drive the
//! rollback decision in the pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, bad version)
  User = 1,
  /// System error (git, registry, I/O)
  System = 2,
  /// Precondition failure (dirty tree, branch, tests)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for rollout
#[derive(Debug)]
pub enum RolloutError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Repository state or test hook rejected the release
  Precondition(PreconditionError),

  /// Next version could not be computed
  Version(VersionError),

  /// Registry publish (or its pre-publish hooks) failed
  Publish(PublishError),

  /// Interactive input could not be obtained
  Prompt(PromptError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RolloutError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RolloutError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RolloutError::Message { message, context, help } => RolloutError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RolloutError::Io(err) => RolloutError::Message {
        message: ctx_str,
        context: Some(err.to_string()),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RolloutError::Config(_) => ExitCode::User,
      RolloutError::Git(_) => ExitCode::System,
      RolloutError::Precondition(_) => ExitCode::Validation,
      RolloutError::Version(_) => ExitCode::User,
      RolloutError::Publish(_) => ExitCode::System,
      RolloutError::Prompt(_) => ExitCode::User,
      RolloutError::Io(_) => ExitCode::System,
      RolloutError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RolloutError::Config(e) => e.help_message(),
      RolloutError::Git(e) => e.help_message(),
      RolloutError::Precondition(e) => e.help_message(),
      RolloutError::Version(e) => e.help_message(),
      RolloutError::Publish(e) => e.help_message(),
      RolloutError::Prompt(e) => e.help_message(),
      RolloutError::Message { help, .. } => help.clone(),
      RolloutError::Io(_) => None,
    }
  }
}

impl fmt::Display for RolloutError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RolloutError::Config(e) => write!(f, "{}", e),
      RolloutError::Git(e) => write!(f, "{}", e),
      RolloutError::Precondition(e) => write!(f, "{}", e),
      RolloutError::Version(e) => write!(f, "{}", e),
      RolloutError::Publish(e) => write!(f, "{}", e),
      RolloutError::Prompt(e) => write!(f, "{}", e),
      RolloutError::Io(e) => write!(f, "I/O error: {}", e),
      RolloutError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RolloutError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RolloutError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RolloutError {
  fn from(err: io::Error) -> Self {
    RolloutError::Io(err)
  }
}

impl From<serde_json::Error> for RolloutError {
  fn from(err: serde_json::Error) -> Self {
    RolloutError::message(format!("JSON error: {}", err))
  }
}

impl From<toml_edit::de::Error> for RolloutError {
  fn from(err: toml_edit::de::Error) -> Self {
    RolloutError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<ConfigError> for RolloutError {
  fn from(err: ConfigError) -> Self {
    RolloutError::Config(err)
  }
}

impl From<GitError> for RolloutError {
  fn from(err: GitError) -> Self {
    RolloutError::Git(err)
  }
}

impl From<PreconditionError> for RolloutError {
  fn from(err: PreconditionError) -> Self {
    RolloutError::Precondition(err)
  }
}

impl From<VersionError> for RolloutError {
  fn from(err: VersionError) -> Self {
    RolloutError::Version(err)
  }
}

impl From<PublishError> for RolloutError {
  fn from(err: PublishError) -> Self {
    RolloutError::Publish(err)
  }
}

impl From<PromptError> for RolloutError {
  fn from(err: PromptError) -> Self {
    RolloutError::Prompt(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// package.json not found in the project root
  ManifestNotFound { path: PathBuf },

  /// A config value is present but unusable
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ManifestNotFound { .. } => Some("Run `rollout release` from the package root.".to_string()),
      ConfigError::InvalidValue { field, .. } => Some(format!(
        "Fix `{}` in rollout.toml or in the \"release\" key of package.json.",
        field
      )),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::ManifestNotFound { path } => {
        write!(f, "No package manifest found.\nExpected file: {}", path.display())
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid config value for '{}': {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. The package is published; pull and push the tag manually.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your SSH key permissions and remote access, then push the release commit and tag manually.".to_string())
        } else {
          Some("The package is published; push the release commit and tag manually.".to_string())
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first, check the path ({}), or pass --skip-git.",
        path.display()
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason)
      }
    }
  }
}

/// Preconditions checked before anything is mutated
#[derive(Debug)]
pub enum PreconditionError {
  /// Working tree has uncommitted changes
  DirtyWorkingTree { changes: Vec<String> },

  /// Local branch and its upstream point at different commits
  RemoteMismatch { branch: String, ahead: u32, behind: u32 },

  /// Local branch has no upstream to compare against
  NoUpstream { branch: String },

  /// Current branch is not in the allow list
  BranchNotAllowed { branch: String, allowed: Vec<String> },

  /// The test hook exited unsuccessfully
  TestsFailed { reason: String },
}

impl PreconditionError {
  fn help_message(&self) -> Option<String> {
    match self {
      PreconditionError::DirtyWorkingTree { .. } => Some("Commit or stash your changes before releasing.".to_string()),
      PreconditionError::RemoteMismatch { behind, .. } if *behind > 0 => {
        Some("Pull the latest changes before releasing.".to_string())
      }
      PreconditionError::RemoteMismatch { .. } => Some("Push your local commits before releasing.".to_string()),
      PreconditionError::NoUpstream { branch } => Some(format!(
        "Set an upstream with `git push -u origin {}` or pass --skip-git.",
        branch
      )),
      PreconditionError::BranchNotAllowed { .. } => {
        Some("Switch branches or allow this one with --allow-branch.".to_string())
      }
      PreconditionError::TestsFailed { .. } => Some("Fix the failing tests or pass --skip-checks.".to_string()),
    }
  }
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PreconditionError::DirtyWorkingTree { changes } => {
        write!(f, "Git working tree is not clean:")?;
        for change in changes {
          write!(f, "\n  {}", change)?;
        }
        Ok(())
      }
      PreconditionError::RemoteMismatch { branch, ahead, behind } => write!(
        f,
        "Local branch '{}' does not match its remote ({} ahead, {} behind)",
        branch, ahead, behind
      ),
      PreconditionError::NoUpstream { branch } => {
        write!(f, "Branch '{}' has no upstream branch to compare against", branch)
      }
      PreconditionError::BranchNotAllowed { branch, allowed } => write!(
        f,
        "Cannot publish from branch: {} (allowed: {})",
        branch,
        allowed.join(", ")
      ),
      PreconditionError::TestsFailed { reason } => write!(f, "Tests failed: {}", reason),
    }
  }
}

/// Version selection errors
#[derive(Debug)]
pub enum VersionError {
  /// Current manifest version is not valid semver
  InvalidCurrent { version: String, reason: String },

  /// A custom version did not parse as semver
  InvalidCustom { input: String },

  /// A prerelease identifier is not a valid semver identifier
  InvalidPreid { preid: String },

  /// A component would overflow
  Overflow { version: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::InvalidCurrent { .. } => Some("Fix the \"version\" field in package.json.".to_string()),
      VersionError::InvalidCustom { .. } => Some(
        "Use a semver literal such as 1.4.0 or 2.0.0-rc.1, or one of patch, minor, major, prepatch, preminor, premajor, prerelease."
          .to_string(),
      ),
      VersionError::InvalidPreid { .. } => {
        Some("Prerelease identifiers may only contain ASCII letters, digits and hyphens.".to_string())
      }
      VersionError::Overflow { .. } => None,
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::InvalidCurrent { version, reason } => {
        write!(f, "Current version '{}' is not valid semver: {}", version, reason)
      }
      VersionError::InvalidCustom { input } => write!(f, "'{}' is not a valid semver version", input),
      VersionError::InvalidPreid { preid } => write!(f, "'{}' is not a valid prerelease identifier", preid),
      VersionError::Overflow { version } => write!(f, "Cannot increment version '{}': component overflow", version),
    }
  }
}

/// Registry publish errors
#[derive(Debug)]
pub enum PublishError {
  /// The registry client could not be spawned
  Spawn { command: String, reason: String },

  /// The publish command exited unsuccessfully
  CommandFailed { command: String, status: String },

  /// A pre-publish lifecycle script failed
  LifecycleFailed { script: String, status: String },

  /// The publish directory does not exist
  MissingPublishDir { path: PathBuf },
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    match self {
      PublishError::Spawn { .. } => {
        Some("Make sure the registry client is installed or set `npm_client` in rollout.toml.".to_string())
      }
      PublishError::CommandFailed { .. } => {
        Some("Check your registry credentials (`npm whoami`) and the package name, then re-run.".to_string())
      }
      PublishError::LifecycleFailed { script, .. } => Some(format!("Run `npm run {}` to reproduce the failure.", script)),
      PublishError::MissingPublishDir { .. } => Some("Build the package into the publish directory first.".to_string()),
    }
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishError::Spawn { command, reason } => write!(f, "Failed to run '{}': {}", command, reason),
      PublishError::CommandFailed { command, status } => write!(f, "'{}' failed ({})", command, status),
      PublishError::LifecycleFailed { script, status } => {
        write!(f, "Lifecycle script '{}' failed ({})", script, status)
      }
      PublishError::MissingPublishDir { path } => {
        write!(f, "Publish directory does not exist: {}", path.display())
      }
    }
  }
}

/// Prompt errors
#[derive(Debug)]
pub enum PromptError {
  /// Input was requested but none can be read
  NotInteractive { question: String },

  /// Reading from the terminal failed or hit EOF
  Input { reason: String },
}

impl PromptError {
  fn help_message(&self) -> Option<String> {
    match self {
      PromptError::NotInteractive { .. } => {
        Some("Pass the next version on the command line (e.g. `rollout release minor`).".to_string())
      }
      PromptError::Input { .. } => None,
    }
  }
}

impl fmt::Display for PromptError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PromptError::NotInteractive { question } => {
        write!(f, "Cannot ask \"{}\" in non-interactive mode", question)
      }
      PromptError::Input { reason } => write!(f, "Failed to read input: {}", reason),
    }
  }
}

/// Result type alias for rollout
pub type RolloutResult<T> = Result<T, RolloutError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RolloutResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RolloutResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RolloutError>,
{
  fn context(self, ctx: impl Into<String>) -> RolloutResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RolloutResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RolloutError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Print a non-fatal problem to stderr
pub fn print_warning(message: impl fmt::Display) {
  eprintln!("⚠️  {}", message);
}
