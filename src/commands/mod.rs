//! CLI commands for rollout
//!
//! - **release**: check, bump, tag and publish the package in the current directory

pub mod release;

pub use release::{ReleaseArgs, run_release};
