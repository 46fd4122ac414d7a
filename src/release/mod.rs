//! Release pipeline for a single npm package
//!
//! - **version**: next-version selection (bump keywords, prerelease, literals)
//! - **request**: the immutable `ReleaseRequest` merged from CLI and config
//! - **manifest**: package.json loading, version rewrite, publish directory staging
//! - **guard**: read-only repository preconditions
//! - **gate**: commit/tag/push and their rollback inverses
//! - **publish**: registry publish with dist-tag, access and lifecycle hooks
//! - **pipeline**: the state machine tying them together

pub mod gate;
pub mod guard;
pub mod manifest;
pub mod pipeline;
pub mod publish;
pub mod request;
pub mod version;

pub use manifest::PackageManifest;
pub use pipeline::{ReleaseOutcome, ReleasePipeline};
pub use request::ReleaseRequest;
