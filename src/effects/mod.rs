//! Effects-as-data for GitHub operations.
//!
//! The policy decides purely from a snapshot and describes the writes it wants
//! as effects. This keeps the decision logic testable with mock interpreters
//! and makes every intended write visible in the logs.

pub mod github;
pub mod interpreter;

pub use github::{GitHubEffect, GitHubResponse};
pub use interpreter::GitHubInterpreter;
