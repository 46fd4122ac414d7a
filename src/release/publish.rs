//! Registry publish with distribution tag, access override and lifecycle hooks

use crate::core::error::{PublishError, RolloutResult, print_warning};
use crate::core::registry::{LifecycleHooks, PackageRegistry, PublishArgs};
use crate::release::manifest::PackageManifest;
use crate::release::version::is_prerelease;
use semver::Version;
use std::path::Path;

pub const LATEST_TAG: &str = "latest";
pub const NEXT_TAG: &str = "next";

/// Pick the distribution tag: an explicit override wins, prereleases go to
/// "next", everything else to "latest"
pub fn dist_tag(version: &Version, npm_tag: Option<&str>) -> String {
  match npm_tag.map(str::trim).filter(|t| !t.is_empty()) {
    Some(tag) => tag.to_string(),
    None if is_prerelease(version) => NEXT_TAG.to_string(),
    None => LATEST_TAG.to_string(),
  }
}

/// "public"/"restricted" for an explicit access override
pub fn access_level(public: Option<bool>) -> Option<&'static str> {
  public.map(|p| if p { "public" } else { "restricted" })
}

pub struct RegistryPublisher<'a> {
  registry: &'a dyn PackageRegistry,
  root: &'a Path,
}

impl<'a> RegistryPublisher<'a> {
  pub fn new(registry: &'a dyn PackageRegistry, root: &'a Path) -> Self {
    Self { registry, root }
  }

  /// Publish the package once.
  ///
  /// With a publish directory the `prepublish`, `prepare` and `prepublishOnly`
  /// scripts run first from the package root, and `publish`/`postpublish`
  /// run afterwards. Post-publish failures are reported and swallowed.
  pub fn publish(
    &self,
    manifest: &PackageManifest,
    tag: &str,
    public: Option<bool>,
    publish_dir: Option<&Path>,
  ) -> RolloutResult<()> {
    let hooks = LifecycleHooks::new(&manifest.scripts, self.registry);

    if let Some(dir) = publish_dir {
      let staged = self.root.join(dir);
      if !staged.is_dir() {
        return Err(PublishError::MissingPublishDir { path: staged }.into());
      }
      hooks.prepublish()?;
      hooks.prepare()?;
      hooks.prepublish_only()?;
    }

    let args = PublishArgs {
      directory: publish_dir.map(Path::to_path_buf),
      tag: (tag != LATEST_TAG).then(|| tag.to_string()),
      access: access_level(public).map(str::to_string),
    };
    tracing::info!(name = %manifest.name, tag, "publishing package");
    self.registry.publish(&args)?;

    if publish_dir.is_some()
      && let Err(err) = hooks.publish().and_then(|_| hooks.postpublish())
    {
      tracing::warn!(error = %err, "post-publish script failed");
      print_warning(format!("Post-publish script failed (package is already published): {}", err));
    }
    Ok(())
  }
}
