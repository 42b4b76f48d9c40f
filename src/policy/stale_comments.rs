//! Recognising retest comments that fresher CI has made obsolete.
//!
//! A retest comment is stale once every required context is green again and
//! was set after the comment (within the grace window): the retest it asked
//! for has happened. Anything we cannot prove is kept.

use tracing::debug;

use crate::types::{IssueComment, PrSnapshot};

use super::StaleGreenCi;
use super::message::is_retest_comment;
use super::staleness::status_supersedes_comment;

impl StaleGreenCi {
    /// Returns true if `comment` is one of our retest comments and CI has rerun
    /// since it was posted.
    pub fn is_stale(
        &self,
        pr: &PrSnapshot,
        comment: &IssueComment,
        required_contexts: &[String],
    ) -> bool {
        if !is_retest_comment(comment, self.identity(), self.message()) {
            return false;
        }

        let stale = comment_before_last_ci(pr, comment, required_contexts);
        if stale {
            debug!(pr = %pr.number, comment = ?comment.id, "Found stale retest comment");
        }
        stale
    }

    /// The stale retest comments among `comments`, in their original order.
    pub fn filter_stale<'a>(
        &self,
        pr: &PrSnapshot,
        comments: &'a [IssueComment],
        required_contexts: &[String],
    ) -> Vec<&'a IssueComment> {
        comments
            .iter()
            .filter(|c| self.is_stale(pr, c, required_contexts))
            .collect()
    }
}

fn comment_before_last_ci(
    pr: &PrSnapshot,
    comment: &IssueComment,
    required_contexts: &[String],
) -> bool {
    if !pr.is_status_success(required_contexts).is_yes() {
        return false;
    }
    let Some(comment_time) = comment.created_at else {
        return false;
    };

    required_contexts.iter().all(|context| {
        pr.status_time(context)
            .is_some_and(|status_time| status_supersedes_comment(status_time, comment_time))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{approved_pr, base_time, contexts};
    use crate::types::{CommentId, StatusState};
    use chrono::{DateTime, TimeDelta, Utc};

    fn policy() -> StaleGreenCi {
        StaleGreenCi::default()
    }

    fn retest_comment(id: u64, created_at: Option<DateTime<Utc>>) -> IssueComment {
        IssueComment::new(
            Some(CommentId(id)),
            "k8s-merge-robot",
            policy().message(),
            created_at,
        )
    }

    fn required() -> Vec<String> {
        contexts(&["ci/build", "ci/test"])
    }

    /// Both contexts green, set one hour after `base_time()`.
    fn rerun_pr() -> PrSnapshot {
        let rerun = base_time() + TimeDelta::hours(1);
        approved_pr(42)
            .with_status("ci/build", StatusState::Success, Some(rerun))
            .with_status("ci/test", StatusState::Success, Some(rerun))
    }

    #[test]
    fn comment_before_rerun_is_stale() {
        let comment = retest_comment(1, Some(base_time()));
        assert!(policy().is_stale(&rerun_pr(), &comment, &required()));
    }

    #[test]
    fn other_authors_and_bodies_are_not_ours() {
        let mut by_human = retest_comment(1, Some(base_time()));
        by_human.author = "contributor".to_string();

        let mut other_body = retest_comment(2, Some(base_time()));
        other_body.body = "/retest".to_string();

        assert!(!policy().is_stale(&rerun_pr(), &by_human, &required()));
        assert!(!policy().is_stale(&rerun_pr(), &other_body, &required()));
    }

    #[test]
    fn not_stale_while_ci_is_not_green() {
        let pr = rerun_pr().with_status("ci/test", StatusState::Pending, Some(base_time()));
        let comment = retest_comment(1, Some(base_time()));
        assert!(!policy().is_stale(&pr, &comment, &required()));

        let mut unknown = rerun_pr();
        unknown.statuses = None;
        assert!(!policy().is_stale(&unknown, &comment, &required()));
    }

    #[test]
    fn missing_creation_time_is_kept() {
        let comment = retest_comment(1, None);
        assert!(!policy().is_stale(&rerun_pr(), &comment, &required()));
    }

    #[test]
    fn unknown_status_time_is_kept() {
        let pr = rerun_pr().with_status("ci/test", StatusState::Success, None);
        let comment = retest_comment(1, Some(base_time()));
        assert!(!policy().is_stale(&pr, &comment, &required()));
    }

    #[test]
    fn one_context_not_rerun_keeps_comment() {
        let pr = rerun_pr().with_status(
            "ci/test",
            StatusState::Success,
            Some(base_time() - TimeDelta::hours(100)),
        );
        let comment = retest_comment(1, Some(base_time()));
        assert!(!policy().is_stale(&pr, &comment, &required()));
    }

    #[test]
    fn grace_window_boundary() {
        let status_time = base_time();
        let pr = approved_pr(42)
            .with_status("ci/build", StatusState::Success, Some(status_time))
            .with_status("ci/test", StatusState::Success, Some(status_time));

        let at_bound = retest_comment(1, Some(status_time + TimeDelta::minutes(30)));
        let past_bound = retest_comment(
            2,
            Some(status_time + TimeDelta::minutes(30) + TimeDelta::seconds(1)),
        );

        assert!(policy().is_stale(&pr, &at_bound, &required()));
        assert!(!policy().is_stale(&pr, &past_bound, &required()));
    }

    #[test]
    fn freshly_posted_comment_is_not_pruned() {
        // The comment the retrigger just posted, against the old green
        // statuses that prompted it.
        let now = base_time();
        let pr = approved_pr(42)
            .with_status("ci/build", StatusState::Success, Some(now - TimeDelta::hours(100)))
            .with_status("ci/test", StatusState::Success, Some(now - TimeDelta::hours(2)));
        let comment = retest_comment(1, Some(now));

        assert!(!policy().is_stale(&pr, &comment, &required()));

        // Once the retest has started the contexts are pending.
        let pending = pr
            .with_status("ci/build", StatusState::Pending, Some(now))
            .with_status("ci/test", StatusState::Pending, Some(now));
        assert!(!policy().is_stale(&pending, &comment, &required()));
    }

    #[test]
    fn filter_stale_preserves_order() {
        let pr = rerun_pr();
        let mut human = retest_comment(2, Some(base_time()));
        human.author = "contributor".to_string();
        let comments = vec![
            retest_comment(3, Some(base_time())),
            human,
            retest_comment(1, Some(base_time() - TimeDelta::hours(200))),
            retest_comment(4, Some(base_time() + TimeDelta::hours(5))),
        ];

        let ids: Vec<_> = policy()
            .filter_stale(&pr, &comments, &required())
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids, vec![Some(CommentId(3)), Some(CommentId(1))]);
    }
}
