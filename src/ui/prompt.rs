//! Interactive prompts
//!
//! The pipeline only talks to the `Prompter` trait. `TerminalPrompter` reads
//! answers line by line from stdin; `AssumePrompter` answers confirmations with
//! a fixed policy and refuses anything that needs real input.

use crate::core::error::{PromptError, RolloutResult};
use std::io::{self, BufRead, Write};

/// Capability to ask the operator questions
pub trait Prompter {
  /// Yes/no question, defaulting to no
  fn confirm(&self, message: &str) -> RolloutResult<bool>;

  /// Pick one of `choices`; returns its index
  fn select_one(&self, message: &str, choices: &[String]) -> RolloutResult<usize>;

  /// Free-form line of input; an empty answer yields `default` (or "")
  fn read_line(&self, message: &str, default: Option<&str>) -> RolloutResult<String>;
}

/// Line-based prompts on stdin/stdout
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
  fn confirm(&self, message: &str) -> RolloutResult<bool> {
    confirm_with(&mut io::stdin().lock(), &mut io::stdout(), message)
  }

  fn select_one(&self, message: &str, choices: &[String]) -> RolloutResult<usize> {
    select_with(&mut io::stdin().lock(), &mut io::stdout(), message, choices)
  }

  fn read_line(&self, message: &str, default: Option<&str>) -> RolloutResult<String> {
    read_line_with(&mut io::stdin().lock(), &mut io::stdout(), message, default)
  }
}

/// Fixed answers for non-interactive runs (`--yes` or `assume = "..."`)
#[derive(Debug, Clone, Copy)]
pub struct AssumePrompter {
  answer: bool,
}

impl AssumePrompter {
  pub fn new(answer: bool) -> Self {
    Self { answer }
  }
}

impl Prompter for AssumePrompter {
  fn confirm(&self, message: &str) -> RolloutResult<bool> {
    println!("? {} {}", message, if self.answer { "yes" } else { "no" });
    Ok(self.answer)
  }

  fn select_one(&self, message: &str, _choices: &[String]) -> RolloutResult<usize> {
    Err(
      PromptError::NotInteractive {
        question: message.to_string(),
      }
      .into(),
    )
  }

  fn read_line(&self, message: &str, _default: Option<&str>) -> RolloutResult<String> {
    Err(
      PromptError::NotInteractive {
        question: message.to_string(),
      }
      .into(),
    )
  }
}

fn read_answer(input: &mut dyn BufRead) -> RolloutResult<String> {
  let mut line = String::new();
  let read = input.read_line(&mut line).map_err(|e| PromptError::Input { reason: e.to_string() })?;
  if read == 0 {
    return Err(
      PromptError::Input {
        reason: "input closed".to_string(),
      }
      .into(),
    );
  }
  Ok(line.trim().to_string())
}

fn ask(output: &mut dyn Write, text: &str) -> RolloutResult<()> {
  write!(output, "{}", text)
    .and_then(|_| output.flush())
    .map_err(|e| PromptError::Input { reason: e.to_string() })?;
  Ok(())
}

fn confirm_with(input: &mut dyn BufRead, output: &mut dyn Write, message: &str) -> RolloutResult<bool> {
  ask(output, &format!("? {} [y/N] ", message))?;
  let answer = read_answer(input)?.to_lowercase();
  Ok(answer == "y" || answer == "yes")
}

fn select_with(
  input: &mut dyn BufRead,
  output: &mut dyn Write,
  message: &str,
  choices: &[String],
) -> RolloutResult<usize> {
  let mut menu = format!("? {}\n", message);
  for (idx, choice) in choices.iter().enumerate() {
    menu.push_str(&format!("  {}) {}\n", idx + 1, choice));
  }
  ask(output, &menu)?;

  loop {
    ask(output, &format!("  Answer [1-{}] (default 1): ", choices.len()))?;
    let answer = read_answer(input)?;
    if answer.is_empty() && !choices.is_empty() {
      return Ok(0);
    }
    match answer.parse::<usize>() {
      Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
      _ => ask(output, &format!("  '{}' is not one of the choices\n", answer))?,
    }
  }
}

fn read_line_with(
  input: &mut dyn BufRead,
  output: &mut dyn Write,
  message: &str,
  default: Option<&str>,
) -> RolloutResult<String> {
  ask(output, &format!("? {} ", message))?;
  let answer = read_answer(input)?;
  if answer.is_empty() {
    return Ok(default.unwrap_or_default().to_string());
  }
  Ok(answer)
}
