//! Effect interpreter trait.
//!
//! The policy never talks to GitHub directly; it hands effects to an
//! interpreter. Production uses the octocrab-backed one in `crate::github`,
//! tests use mocks that record what they were asked to do.

use std::fmt;
use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct RecordingInterpreter {
///     seen: Mutex<Vec<GitHubEffect>>,
/// }
///
/// impl GitHubInterpreter for RecordingInterpreter {
///     type Error = String;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         self.seen.lock().unwrap().push(effect);
///         Ok(GitHubResponse::PendingReached)
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error: fmt::Display;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}
