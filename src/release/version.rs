//! Next-version selection
//!
//! Pure functions over `semver::Version`. Increments follow the npm registry's
//! semver rules: a plain bump of a prerelease "graduates" it (1.3.0-rc.1 minor
//! becomes 1.3.0) and the `pre*` bumps start a `<id>.0` or `0` prerelease.

use crate::core::error::VersionError;
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Named version bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKeyword {
  Patch,
  Minor,
  Major,
  Prepatch,
  Preminor,
  Premajor,
}

impl BumpKeyword {
  /// In the order they are offered to the operator
  pub const ALL: [BumpKeyword; 6] = [
    BumpKeyword::Patch,
    BumpKeyword::Minor,
    BumpKeyword::Major,
    BumpKeyword::Prepatch,
    BumpKeyword::Preminor,
    BumpKeyword::Premajor,
  ];

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "patch" => Some(BumpKeyword::Patch),
      "minor" => Some(BumpKeyword::Minor),
      "major" => Some(BumpKeyword::Major),
      "prepatch" => Some(BumpKeyword::Prepatch),
      "preminor" => Some(BumpKeyword::Preminor),
      "premajor" => Some(BumpKeyword::Premajor),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      BumpKeyword::Patch => "patch",
      BumpKeyword::Minor => "minor",
      BumpKeyword::Major => "major",
      BumpKeyword::Prepatch => "prepatch",
      BumpKeyword::Preminor => "preminor",
      BumpKeyword::Premajor => "premajor",
    }
  }

  /// Menu label ("Patch", "Preminor", ...)
  pub fn label(&self) -> &'static str {
    match self {
      BumpKeyword::Patch => "Patch",
      BumpKeyword::Minor => "Minor",
      BumpKeyword::Major => "Major",
      BumpKeyword::Prepatch => "Prepatch",
      BumpKeyword::Preminor => "Preminor",
      BumpKeyword::Premajor => "Premajor",
    }
  }

  fn increment(&self) -> Increment {
    match self {
      BumpKeyword::Patch => Increment::Patch,
      BumpKeyword::Minor => Increment::Minor,
      BumpKeyword::Major => Increment::Major,
      BumpKeyword::Prepatch => Increment::Prepatch,
      BumpKeyword::Preminor => Increment::Preminor,
      BumpKeyword::Premajor => Increment::Premajor,
    }
  }
}

impl fmt::Display for BumpKeyword {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How the next version is requested. Exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChoice {
  /// A literal that is already valid semver
  ExplicitSemver(String),
  BumpKeyword(BumpKeyword),
  /// Prerelease increment, optionally switching identifier
  Prerelease(Option<String>),
  /// Operator-entered literal, validated on resolve
  Custom(String),
}

impl VersionChoice {
  /// Classify a command-line version argument
  pub fn from_arg(arg: &str, preid: Option<&str>) -> Self {
    let arg = arg.trim();
    if arg == "prerelease" {
      return VersionChoice::Prerelease(preid.map(str::to_string));
    }
    if let Some(keyword) = BumpKeyword::parse(arg) {
      return VersionChoice::BumpKeyword(keyword);
    }
    if parse_literal(arg).is_some() {
      return VersionChoice::ExplicitSemver(arg.to_string());
    }
    VersionChoice::Custom(arg.to_string())
  }
}

/// Parse a semver literal, accepting a leading `v` or `=`
pub fn parse_literal(input: &str) -> Option<Version> {
  let trimmed = input.trim();
  let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed);
  let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
  Version::parse(trimmed).ok()
}

/// Parse the manifest's current version
pub fn parse_current(version: &str) -> Result<Version, VersionError> {
  Version::parse(version.trim()).map_err(|e| VersionError::InvalidCurrent {
    version: version.to_string(),
    reason: e.to_string(),
  })
}

/// Compute the next version.
///
/// `preid` applies to the `pre*` bump keywords; a `Prerelease` choice carries
/// its own identifier and falls back to the one already on `current`.
pub fn resolve(current: &Version, choice: &VersionChoice, preid: Option<&str>) -> Result<Version, VersionError> {
  match choice {
    VersionChoice::ExplicitSemver(literal) | VersionChoice::Custom(literal) => {
      parse_literal(literal).ok_or_else(|| VersionError::InvalidCustom { input: literal.clone() })
    }
    VersionChoice::BumpKeyword(keyword) => increment(current, keyword.increment(), preid),
    VersionChoice::Prerelease(id) => {
      let id = id.clone().or_else(|| existing_identifier(current));
      increment(current, Increment::Prerelease, id.as_deref())
    }
  }
}

/// The six bump candidates offered when no version was requested
pub fn candidates(current: &Version, preid: Option<&str>) -> Result<Vec<(BumpKeyword, Version)>, VersionError> {
  BumpKeyword::ALL
    .iter()
    .map(|keyword| Ok((*keyword, increment(current, keyword.increment(), preid)?)))
    .collect()
}

/// Leading non-numeric prerelease identifier ("beta" in 1.2.3-beta.1)
pub fn existing_identifier(version: &Version) -> Option<String> {
  let first = version.pre.as_str().split('.').next()?;
  if first.is_empty() || first.parse::<u64>().is_ok() {
    return None;
  }
  Some(first.to_string())
}

pub fn is_prerelease(version: &Version) -> bool {
  !version.pre.is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Increment {
  Patch,
  Minor,
  Major,
  Prepatch,
  Preminor,
  Premajor,
  Prerelease,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Ident {
  Num(u64),
  Alpha(String),
}

impl fmt::Display for Ident {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Ident::Num(n) => write!(f, "{}", n),
      Ident::Alpha(s) => f.write_str(s),
    }
  }
}

fn increment(current: &Version, inc: Increment, preid: Option<&str>) -> Result<Version, VersionError> {
  let overflow = || VersionError::Overflow {
    version: current.to_string(),
  };
  let bump = |n: u64| n.checked_add(1).ok_or_else(overflow);

  let mut next = current.clone();
  next.build = BuildMetadata::EMPTY;
  let was_prerelease = is_prerelease(current);

  match inc {
    Increment::Major => {
      if next.minor != 0 || next.patch != 0 || !was_prerelease {
        next.major = bump(next.major)?;
      }
      next.minor = 0;
      next.patch = 0;
      next.pre = Prerelease::EMPTY;
    }
    Increment::Minor => {
      if next.patch != 0 || !was_prerelease {
        next.minor = bump(next.minor)?;
      }
      next.patch = 0;
      next.pre = Prerelease::EMPTY;
    }
    Increment::Patch => {
      if !was_prerelease {
        next.patch = bump(next.patch)?;
      }
      next.pre = Prerelease::EMPTY;
    }
    Increment::Premajor => {
      next.major = bump(next.major)?;
      next.minor = 0;
      next.patch = 0;
      next.pre = bump_prerelease(&[], preid)?;
    }
    Increment::Preminor => {
      next.minor = bump(next.minor)?;
      next.patch = 0;
      next.pre = bump_prerelease(&[], preid)?;
    }
    Increment::Prepatch => {
      next.patch = bump(next.patch)?;
      next.pre = bump_prerelease(&[], preid)?;
    }
    Increment::Prerelease => {
      if !was_prerelease {
        next.patch = bump(next.patch)?;
      }
      next.pre = bump_prerelease(&split_prerelease(&current.pre), preid)?;
    }
  }

  Ok(next)
}

fn split_prerelease(pre: &Prerelease) -> Vec<Ident> {
  if pre.is_empty() {
    return Vec::new();
  }
  pre
    .as_str()
    .split('.')
    .map(|part| match part.parse::<u64>() {
      Ok(n) if part == "0" || !part.starts_with('0') => Ident::Num(n),
      _ => Ident::Alpha(part.to_string()),
    })
    .collect()
}

/// Bump the last numeric identifier (appending `0` if there is none), then
/// switch to `<preid>.0` unless already on that identifier.
fn bump_prerelease(current: &[Ident], preid: Option<&str>) -> Result<Prerelease, VersionError> {
  let mut idents = current.to_vec();

  if idents.is_empty() {
    idents.push(Ident::Num(0));
  } else if let Some(pos) = idents.iter().rposition(|i| matches!(i, Ident::Num(_))) {
    if let Ident::Num(n) = idents[pos] {
      idents[pos] = Ident::Num(n.checked_add(1).ok_or_else(|| VersionError::Overflow {
        version: join(current),
      })?);
    }
  } else {
    idents.push(Ident::Num(0));
  }

  if let Some(id) = preid.filter(|id| !id.is_empty()) {
    let same_identifier = matches!(idents.first(), Some(Ident::Alpha(first)) if first == id);
    let numbered = matches!(idents.get(1), Some(Ident::Num(_)));
    if !(same_identifier && numbered) {
      idents = vec![Ident::Alpha(id.to_string()), Ident::Num(0)];
    }
  }

  let joined = join(&idents);
  Prerelease::new(&joined).map_err(|_| VersionError::InvalidPreid {
    preid: preid.unwrap_or(&joined).to_string(),
  })
}

fn join(idents: &[Ident]) -> String {
  idents.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(".")
}
