//! Time predicates shared by the retrigger and the comment classifier.
//!
//! Both compare against the same constants, so the two directions (status
//! age against the clock, comment age against status age) cannot drift apart.

use chrono::{DateTime, Utc};

use super::{comment_grace_window, staleness_threshold};

/// Returns true if a status set at `status_time` is too old to trust at `now`.
///
/// Strictly greater than the threshold: a status exactly 96 hours old is
/// still fresh.
pub fn is_status_stale(status_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(status_time) > staleness_threshold()
}

/// Returns true if a status set at `status_time` supersedes a comment created
/// at `comment_time`.
///
/// The status counts as newer unless the comment was created strictly after
/// `status_time` plus the grace window.
pub fn status_supersedes_comment(
    status_time: DateTime<Utc>,
    comment_time: DateTime<Utc>,
) -> bool {
    comment_time <= status_time + comment_grace_window()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{arb_fresh_age, arb_stale_age, base_time};
    use chrono::TimeDelta;
    use proptest::prelude::*;

    #[test]
    fn exactly_at_threshold_is_fresh() {
        let now = base_time();
        assert!(!is_status_stale(now - TimeDelta::hours(96), now));
    }

    #[test]
    fn one_second_past_threshold_is_stale() {
        let now = base_time();
        assert!(is_status_stale(
            now - TimeDelta::hours(96) - TimeDelta::seconds(1),
            now
        ));
    }

    #[test]
    fn comment_at_grace_bound_is_superseded() {
        let status = base_time();
        assert!(status_supersedes_comment(
            status,
            status + TimeDelta::minutes(30)
        ));
    }

    #[test]
    fn comment_past_grace_bound_is_not_superseded() {
        let status = base_time();
        assert!(!status_supersedes_comment(
            status,
            status + TimeDelta::minutes(30) + TimeDelta::seconds(1)
        ));
    }

    proptest! {
        #[test]
        fn fresh_ages_are_never_stale(age in arb_fresh_age()) {
            let now = base_time();
            prop_assert!(!is_status_stale(now - age, now));
        }

        #[test]
        fn stale_ages_are_always_stale(age in arb_stale_age()) {
            let now = base_time();
            prop_assert!(is_status_stale(now - age, now));
        }

        #[test]
        fn statuses_after_the_comment_always_supersede(secs in 0i64..10_000_000) {
            let comment = base_time();
            prop_assert!(status_supersedes_comment(comment + TimeDelta::seconds(secs), comment));
        }
    }
}
