//! The canonical retest comment.
//!
//! The body's exact bytes are the only link between a comment on GitHub and
//! the policy that posted it, so it must render identically on every call.

use crate::types::IssueComment;

use super::{BotIdentity, STALE_GREEN_CI_HOURS};

/// Renders the retest comment that mentions `retest_mention`.
pub fn retest_message(retest_mention: &str) -> String {
    format!(
        "@{retest_mention} test this\n\nTests are more than {STALE_GREEN_CI_HOURS} hours old. Re-running tests."
    )
}

/// Returns true if `comment` was posted by the bot with exactly `message`.
pub fn is_retest_comment(comment: &IssueComment, identity: &BotIdentity, message: &str) -> bool {
    comment.author == identity.login && comment.body == message
}
