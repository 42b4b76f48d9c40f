//! GitHub API effect types.
//!
//! These describe the GitHub operations the policy and the sweep need, without
//! executing them. `crate::github` interprets them against the real API.

use serde::{Deserialize, Serialize};

use crate::types::{CommentId, IssueComment, PrNumber, PrSnapshot};

/// A GitHub API effect.
///
/// Effects are repo-scoped: the interpreter is constructed with a `RepoId`,
/// so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Queries ──────────────────────────────────────────────────────────────
    /// List the numbers of all open issues, pull requests included.
    ListOpenIssues,

    /// Load labels, mergeability and head-commit statuses for one issue.
    LoadSnapshot { pr: PrNumber },

    /// List all comments on an issue.
    ListComments { pr: PrNumber },

    // ─── Mutations ────────────────────────────────────────────────────────────
    /// Post a new comment with exactly this body.
    PostComment { pr: PrNumber, body: String },

    /// Block until the named contexts are pending on the PR's head commit, or
    /// the interpreter's wait timeout elapses.
    WaitForPending { pr: PrNumber, contexts: Vec<String> },

    /// Delete an issue comment.
    DeleteComment { comment_id: CommentId },
}

impl GitHubEffect {
    /// Short name for log lines and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::ListOpenIssues => "list_open_issues",
            GitHubEffect::LoadSnapshot { .. } => "load_snapshot",
            GitHubEffect::ListComments { .. } => "list_comments",
            GitHubEffect::PostComment { .. } => "post_comment",
            GitHubEffect::WaitForPending { .. } => "wait_for_pending",
            GitHubEffect::DeleteComment { .. } => "delete_comment",
        }
    }

    /// Whether a transient failure of this effect may be retried in place.
    ///
    /// Posting and waiting are never retried within one pass; the next sweep
    /// re-evaluates the PR from scratch instead. Deletes are idempotent.
    pub fn is_retriable(&self) -> bool {
        !matches!(
            self,
            GitHubEffect::PostComment { .. } | GitHubEffect::WaitForPending { .. }
        )
    }
}

/// Response from a GitHub effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `ListOpenIssues`.
    IssueList(Vec<PrNumber>),

    /// Response to `LoadSnapshot`.
    Snapshot(PrSnapshot),

    /// Response to `ListComments`.
    Comments(Vec<IssueComment>),

    /// Response to `PostComment`.
    CommentPosted { id: CommentId },

    /// Response to `WaitForPending` once the contexts went pending.
    PendingReached,

    /// Response to `WaitForPending` when the wait timed out first.
    PendingTimedOut,

    /// Response to `DeleteComment`.
    CommentDeleted,
}
