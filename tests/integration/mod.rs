//! Integration tests driving the rollout binary against temporary git repositories
//!
//! The fake registry client is a shell script, so these only run on Unix.

#![cfg(unix)]

mod helpers;
mod test_release;
