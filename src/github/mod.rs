//! GitHub API client and effect interpreter.
//!
//! Executes `GitHubEffect`s via octocrab:
//! - Exponential backoff retry for transient failures on reads and deletes
//! - Transient vs permanent error categorization
//! - Pending waits bounded by a configurable timeout

mod client;
mod error;
mod interpreter;
mod retry;

pub use client::{OctocrabClient, PendingWaitConfig};
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_github_effect;
pub use retry::{RetryConfig, RetryPolicy, retry_with_backoff};
