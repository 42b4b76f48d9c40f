//! Issue comments as the policy sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CommentId;

/// A comment on an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    /// The comment ID. Needed only to delete the comment.
    pub id: Option<CommentId>,
    /// The author's login.
    pub author: String,
    /// The comment body, verbatim.
    pub body: String,
    /// When the comment was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl IssueComment {
    pub fn new(
        id: Option<CommentId>,
        author: impl Into<String>,
        body: impl Into<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        IssueComment {
            id,
            author: author.into(),
            body: body.into(),
            created_at,
        }
    }
}
