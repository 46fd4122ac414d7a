//! Core building blocks shared by rollout commands
//!
//! - **config**: rollout.toml / package.json "release" configuration
//! - **context**: `RunContext` holding the package root and injected collaborators
//! - **error**: Error types with contextual help messages and exit codes
//! - **registry**: Package registry client and lifecycle hooks
//! - **vcs**: Git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod registry;
pub mod vcs;
