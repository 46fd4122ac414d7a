//! package.json reading, version rewrite and publish directory staging

use crate::core::error::{ConfigError, ResultExt, RolloutResult};
use semver::Version;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Entry-point fields rewritten when staging a publish directory
const ENTRY_FIELDS: [&str; 3] = ["main", "module", "types"];

/// Fields dropped from the staged manifest
const STAGED_STRIP_FIELDS: [&str; 2] = ["scripts", "devDependencies"];

/// Root files copied into a publish directory (matched case-insensitively by prefix)
const STAGED_FILE_PREFIXES: [&str; 4] = ["README", "LICENSE", "LICENCE", "CHANGELOG"];

/// Package manifest loaded once at the start of a run
#[derive(Debug, Clone)]
pub struct PackageManifest {
  pub path: PathBuf,
  pub name: String,
  pub version: String,
  pub main: Option<String>,
  pub module: Option<String>,
  pub scripts: BTreeMap<String, String>,
  raw: Map<String, Value>,
}

impl PackageManifest {
  pub fn load(path: &Path) -> RolloutResult<Self> {
    if !path.exists() {
      return Err(
        ConfigError::ManifestNotFound {
          path: path.to_path_buf(),
        }
        .into(),
      );
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    Self::from_value(path, value)
  }

  pub fn from_value(path: &Path, value: Value) -> RolloutResult<Self> {
    let Value::Object(raw) = value else {
      return Err(invalid("package.json", "expected a JSON object").into());
    };

    let name = string_field(&raw, "name")?.ok_or_else(|| invalid("name", "missing"))?;
    let version = string_field(&raw, "version")?.ok_or_else(|| invalid("version", "missing"))?;
    let main = string_field(&raw, "main")?;
    let module = string_field(&raw, "module")?;

    let mut scripts = BTreeMap::new();
    if let Some(table) = raw.get("scripts") {
      let Value::Object(table) = table else {
        return Err(invalid("scripts", "expected an object").into());
      };
      for (script, command) in table {
        if let Value::String(command) = command {
          scripts.insert(script.clone(), command.clone());
        }
      }
    }

    Ok(Self {
      path: path.to_path_buf(),
      name,
      version,
      main,
      module,
      scripts,
      raw,
    })
  }

  /// The manifest as parsed (used for the "release" config key)
  pub fn raw(&self) -> Value {
    Value::Object(self.raw.clone())
  }

  /// Manifest document with `version` replaced, all other keys in original order
  pub fn with_version(&self, version: &str) -> Map<String, Value> {
    let mut doc = self.raw.clone();
    doc.insert("version".to_string(), Value::String(version.to_string()));
    doc
  }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
  ConfigError::InvalidValue {
    field: format!("package.json {}", field),
    reason: reason.to_string(),
  }
}

fn string_field(raw: &Map<String, Value>, field: &str) -> Result<Option<String>, ConfigError> {
  match raw.get(field) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) => Ok(Some(s.clone())),
    Some(_) => Err(invalid(field, "expected a string")),
  }
}

/// Writes the bumped manifest and stages the publish directory
pub struct ManifestWriter<'a> {
  root: &'a Path,
  publish_dir: Option<&'a Path>,
}

impl<'a> ManifestWriter<'a> {
  pub fn new(root: &'a Path, publish_dir: Option<&'a Path>) -> Self {
    Self { root, publish_dir }
  }

  /// Rewrite package.json with `next` and stage the publish directory if one is set
  pub fn bump_and_persist(&self, manifest: &PackageManifest, next: &Version) -> RolloutResult<()> {
    let version = next.to_string();
    write_json(&manifest.path, &manifest.with_version(&version))?;
    tracing::info!(path = %manifest.path.display(), version = %version, "manifest version updated");

    if self.publish_dir.is_some() {
      self.stage_publish_dir(manifest, next)?;
    }
    Ok(())
  }

  /// Populate the publish directory with a publishable manifest and docs.
  ///
  /// Returns the directory path, or None when no publish directory is set.
  pub fn stage_publish_dir(&self, manifest: &PackageManifest, version: &Version) -> RolloutResult<Option<PathBuf>> {
    let Some(publish_dir) = self.publish_dir else {
      return Ok(None);
    };
    let out_dir = self.root.join(publish_dir);
    fs::create_dir_all(&out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut doc = manifest.with_version(&version.to_string());
    for field in STAGED_STRIP_FIELDS {
      doc.remove(field);
    }
    for field in ENTRY_FIELDS {
      if let Some(Value::String(entry)) = doc.get_mut(field) {
        *entry = relative_entry(entry, publish_dir);
      }
    }
    write_json(&out_dir.join("package.json"), &doc)?;

    for entry in fs::read_dir(self.root).with_context(|| format!("Failed to read {}", self.root.display()))? {
      let entry = entry?;
      if !entry.file_type()?.is_file() {
        continue;
      }
      let file_name = entry.file_name();
      let upper = file_name.to_string_lossy().to_uppercase();
      if STAGED_FILE_PREFIXES.iter().any(|prefix| upper.starts_with(prefix)) {
        fs::copy(entry.path(), out_dir.join(&file_name))
          .with_context(|| format!("Failed to copy {} into {}", entry.path().display(), out_dir.display()))?;
      }
    }

    tracing::info!(
      dir = %out_dir.display(),
      main = ?manifest.main,
      module = ?manifest.module,
      "publish directory staged"
    );
    Ok(Some(out_dir))
  }
}

/// Make an entry path relative to the publish directory ("lib/index.js" → "index.js")
fn relative_entry(entry: &str, publish_dir: &Path) -> String {
  let normalize = |p: &Path| -> Vec<String> {
    p.components()
      .filter_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().to_string()),
        _ => None,
      })
      .collect()
  };
  let dir = normalize(publish_dir);
  let parts = normalize(Path::new(entry));

  if dir.is_empty() || publish_dir.is_absolute() || parts.len() <= dir.len() || parts[..dir.len()] != dir[..] {
    return entry.to_string();
  }
  parts[dir.len()..].join("/")
}

/// 2-space pretty JSON with a trailing newline
fn write_json(path: &Path, doc: &Map<String, Value>) -> RolloutResult<()> {
  let mut content = serde_json::to_string_pretty(doc)?;
  content.push('\n');
  fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
