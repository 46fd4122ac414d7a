//! In-memory collaborators for unit tests
//!
//! Each fake records the calls it receives. Clones share the same log, so a
//! test can box one clone into a `RunContext` and assert on another.

use crate::core::error::{GitError, PreconditionError, PublishError, RolloutResult};
use crate::core::registry::{PackageRegistry, PublishArgs};
use crate::core::vcs::{RemoteStatus, VersionControl};
use crate::ui::prompt::Prompter;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

type CallLog = Rc<RefCell<Vec<String>>>;

fn record(log: &CallLog, call: impl Into<String>) {
  log.borrow_mut().push(call.into());
}

/// Version control double; clean, in sync and on `master` by default
#[derive(Clone)]
pub struct FakeVcs {
  calls: CallLog,
  status: Vec<String>,
  remote: RemoteStatus,
  remote_url: Option<String>,
  fail_on: Option<String>,
}

impl Default for FakeVcs {
  fn default() -> Self {
    Self {
      calls: CallLog::default(),
      status: Vec::new(),
      remote: RemoteStatus {
        branch: "master".to_string(),
        upstream: Some("origin/master".to_string()),
        ahead: 0,
        behind: 0,
      },
      remote_url: Some("git@example.com:acme/widget.git".to_string()),
      fail_on: None,
    }
  }
}

impl FakeVcs {
  pub fn with_status(mut self, lines: &[&str]) -> Self {
    self.status = lines.iter().map(|l| l.to_string()).collect();
    self
  }

  pub fn with_branch(mut self, branch: &str) -> Self {
    self.remote.branch = branch.to_string();
    self.remote.upstream = Some(format!("origin/{}", branch));
    self
  }

  pub fn with_remote(mut self, ahead: u32, behind: u32) -> Self {
    self.remote.ahead = ahead;
    self.remote.behind = behind;
    self
  }

  pub fn without_upstream(mut self) -> Self {
    self.remote.upstream = None;
    self
  }

  pub fn with_remote_url(mut self, url: &str) -> Self {
    self.remote_url = Some(url.to_string());
    self
  }

  /// Make the operation whose call starts with `op` fail (it is still recorded)
  pub fn failing(mut self, op: &str) -> Self {
    self.fail_on = Some(op.to_string());
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }

  fn call(&self, call: String) -> RolloutResult<()> {
    record(&self.calls, call.clone());
    if let Some(op) = &self.fail_on
      && call.starts_with(op.as_str())
    {
      return Err(
        GitError::CommandFailed {
          command: format!("git {}", call),
          stderr: "simulated failure".to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }
}

impl VersionControl for FakeVcs {
  fn status(&self) -> RolloutResult<Vec<String>> {
    self.call("status".to_string())?;
    Ok(self.status.clone())
  }

  fn remote_status(&self) -> RolloutResult<RemoteStatus> {
    self.call("remote-status".to_string())?;
    Ok(self.remote.clone())
  }

  fn current_branch(&self) -> RolloutResult<String> {
    self.call("current-branch".to_string())?;
    Ok(self.remote.branch.clone())
  }

  fn add_file(&self, path: &Path) -> RolloutResult<()> {
    self.call(format!("add {}", path.display()))
  }

  fn commit(&self, message: &str) -> RolloutResult<()> {
    self.call(format!("commit {}", message))
  }

  fn create_tag(&self, name: &str) -> RolloutResult<()> {
    self.call(format!("tag {}", name))
  }

  fn delete_tag(&self, name: &str) -> RolloutResult<()> {
    self.call(format!("delete-tag {}", name))
  }

  fn delete_last_commit(&self) -> RolloutResult<()> {
    self.call("delete-last-commit".to_string())
  }

  fn push_with_tags(&self) -> RolloutResult<()> {
    self.call("push".to_string())
  }

  fn remote_url(&self) -> RolloutResult<Option<String>> {
    self.call("remote-url".to_string())?;
    Ok(self.remote_url.clone())
  }
}

/// Registry double recording `test`, `run <script>` and `publish <args>`
#[derive(Clone, Default)]
pub struct FakeRegistry {
  calls: CallLog,
  fail_tests: bool,
  fail_publish: bool,
  fail_scripts: Vec<String>,
}

impl FakeRegistry {
  pub fn failing_tests(mut self) -> Self {
    self.fail_tests = true;
    self
  }

  pub fn failing_publish(mut self) -> Self {
    self.fail_publish = true;
    self
  }

  pub fn failing_script(mut self, script: &str) -> Self {
    self.fail_scripts.push(script.to_string());
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.borrow().clone()
  }
}

impl PackageRegistry for FakeRegistry {
  fn run_tests(&self) -> RolloutResult<()> {
    record(&self.calls, "test");
    if self.fail_tests {
      return Err(
        PreconditionError::TestsFailed {
          reason: "exit status: 1".to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn run_script(&self, name: &str) -> RolloutResult<()> {
    record(&self.calls, format!("run {}", name));
    if self.fail_scripts.iter().any(|s| s == name) {
      return Err(
        PublishError::LifecycleFailed {
          script: name.to_string(),
          status: "exit status: 1".to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn publish(&self, args: &PublishArgs) -> RolloutResult<()> {
    let argv = args.to_args();
    record(&self.calls, argv.join(" "));
    if self.fail_publish {
      return Err(
        PublishError::CommandFailed {
          command: format!("npm {}", argv.join(" ")),
          status: "exit status: 1".to_string(),
        }
        .into(),
      );
    }
    Ok(())
  }
}

/// One scripted answer, consumed in order
#[derive(Debug, Clone)]
pub enum Answer {
  Confirm(bool),
  Select(usize),
  Line(String),
}

/// Prompter returning scripted answers; panics when the script runs out or
/// the next answer is of the wrong kind
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
  answers: Rc<RefCell<VecDeque<Answer>>>,
  asked: CallLog,
  choices: CallLog,
}

impl ScriptedPrompter {
  pub fn push(&self, answer: Answer) {
    self.answers.borrow_mut().push_back(answer);
  }

  /// Every question asked so far
  pub fn asked(&self) -> Vec<String> {
    self.asked.borrow().clone()
  }

  /// Choices offered by the last `select_one`
  pub fn choices(&self) -> Vec<String> {
    self.choices.borrow().clone()
  }

  fn next(&self, question: &str) -> Answer {
    record(&self.asked, question);
    match self.answers.borrow_mut().pop_front() {
      Some(answer) => answer,
      None => panic!("no scripted answer for: {}", question),
    }
  }
}

impl Prompter for ScriptedPrompter {
  fn confirm(&self, message: &str) -> RolloutResult<bool> {
    match self.next(message) {
      Answer::Confirm(answer) => Ok(answer),
      other => panic!("expected a confirm answer for '{}', got {:?}", message, other),
    }
  }

  fn select_one(&self, message: &str, choices: &[String]) -> RolloutResult<usize> {
    *self.choices.borrow_mut() = choices.to_vec();
    match self.next(message) {
      Answer::Select(idx) => Ok(idx),
      other => panic!("expected a select answer for '{}', got {:?}", message, other),
    }
  }

  fn read_line(&self, message: &str, default: Option<&str>) -> RolloutResult<String> {
    match self.next(message) {
      Answer::Line(line) if line.is_empty() => Ok(default.unwrap_or_default().to_string()),
      Answer::Line(line) => Ok(line),
      other => panic!("expected a line answer for '{}', got {:?}", message, other),
    }
  }
}
