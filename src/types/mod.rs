//! Core domain types for the stale CI policy.
//!
//! Everything here is plain data: snapshots are loaded by the GitHub client and
//! handed to the policy, which only reads them.

pub mod comment;
pub mod ids;
pub mod snapshot;
pub mod status;
pub mod tristate;

pub use comment::IssueComment;
pub use ids::{CommentId, InvalidRepoId, PrNumber, RepoId, Sha};
pub use snapshot::PrSnapshot;
pub use status::{AggregateStatus, ContextStatus, StatusState, aggregate_status};
pub use tristate::Tristate;
