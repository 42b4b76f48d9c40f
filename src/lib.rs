//! Stale Green CI - re-tests approved pull requests whose green CI has gone stale.
//!
//! The library provides the policy (pure decisions over a PR snapshot), the
//! effect types it emits, an octocrab-backed interpreter for them, and the
//! sweep that drives the policy over a repository.

pub mod config;
pub mod effects;
pub mod github;
pub mod policy;
pub mod sweep;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
