//! Point-in-time view of an issue or pull request.
//!
//! A snapshot is loaded fresh for every policy invocation and never mutated by
//! the policy. All writes go through the effect interpreter instead.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, Sha};
use super::status::{AggregateStatus, ContextStatus, StatusState, aggregate_status};
use super::tristate::Tristate;

/// The data the staleness policy reads about one issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrSnapshot {
    /// The issue/PR number.
    pub number: PrNumber,

    /// False for plain issues, which are never eligible for a retest.
    pub is_pull_request: bool,

    /// Label names currently on the issue.
    pub labels: BTreeSet<String>,

    /// GitHub's mergeability, which stays `Unknown` while it is being computed.
    pub mergeable: Tristate,

    /// Head commit the statuses belong to. `None` for plain issues.
    pub head_sha: Option<Sha>,

    /// Latest status per context on the head commit.
    ///
    /// `None` means the statuses are not known, as opposed to known-empty.
    pub statuses: Option<BTreeMap<String, ContextStatus>>,
}

impl PrSnapshot {
    /// A snapshot of a plain issue: no mergeability, no statuses.
    pub fn issue(number: PrNumber, labels: BTreeSet<String>) -> Self {
        PrSnapshot {
            number,
            is_pull_request: false,
            labels,
            mergeable: Tristate::Unknown,
            head_sha: None,
            statuses: None,
        }
    }

    /// A snapshot of a pull request.
    pub fn pull_request(
        number: PrNumber,
        labels: BTreeSet<String>,
        mergeable: Tristate,
        head_sha: Sha,
        statuses: Option<BTreeMap<String, ContextStatus>>,
    ) -> Self {
        PrSnapshot {
            number,
            is_pull_request: true,
            labels,
            mergeable,
            head_sha: Some(head_sha),
            statuses,
        }
    }

    /// Adds a label.
    pub fn with_label(mut self, name: impl Into<String>) -> Self {
        self.labels.insert(name.into());
        self
    }

    /// Sets the status of `context`, replacing any earlier one. Marks the
    /// statuses as known.
    pub fn with_status(
        mut self,
        context: impl Into<String>,
        state: StatusState,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.statuses
            .get_or_insert_with(BTreeMap::new)
            .insert(context.into(), ContextStatus::new(state, updated_at));
        self
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains(name)
    }

    pub fn is_mergeable(&self) -> Tristate {
        self.mergeable
    }

    /// Whether every one of `contexts` is currently green.
    ///
    /// `Unknown` when the statuses could not be determined at all. A context
    /// that simply hasn't reported yet makes the answer `No`.
    pub fn is_status_success(&self, contexts: &[String]) -> Tristate {
        match &self.statuses {
            None => Tristate::Unknown,
            Some(statuses) => {
                Tristate::from(aggregate_status(statuses, contexts) == AggregateStatus::Success)
            }
        }
    }

    /// When `context` was last set, if known.
    pub fn status_time(&self, context: &str) -> Option<DateTime<Utc>> {
        self.statuses.as_ref()?.get(context)?.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    fn snapshot(statuses: Option<BTreeMap<String, ContextStatus>>) -> PrSnapshot {
        PrSnapshot::pull_request(
            PrNumber(7),
            BTreeSet::from(["lgtm".to_string()]),
            Tristate::Yes,
            Sha::new("a".repeat(40)),
            statuses,
        )
    }

    #[test]
    fn unknown_statuses_are_unknown_not_failed() {
        let pr = snapshot(None);
        assert_eq!(
            pr.is_status_success(&["ci/build".to_string()]),
            Tristate::Unknown
        );
        assert_eq!(pr.status_time("ci/build"), None);
    }

    #[test]
    fn status_time_reads_the_named_context() {
        let statuses = BTreeMap::from([
            (
                "ci/build".to_string(),
                ContextStatus::new(StatusState::Success, Some(at(3))),
            ),
            (
                "ci/test".to_string(),
                ContextStatus::new(StatusState::Success, None),
            ),
        ]);
        let pr = snapshot(Some(statuses));

        assert_eq!(pr.status_time("ci/build"), Some(at(3)));
        assert_eq!(pr.status_time("ci/test"), None);
        assert_eq!(pr.status_time("ci/lint"), None);
        assert_eq!(
            pr.is_status_success(&["ci/build".to_string(), "ci/test".to_string()]),
            Tristate::Yes
        );
        assert_eq!(
            pr.is_status_success(&["ci/build".to_string(), "ci/lint".to_string()]),
            Tristate::No
        );
    }

    #[test]
    fn issue_snapshot_is_not_a_pull_request() {
        let issue = PrSnapshot::issue(PrNumber(1), BTreeSet::new());
        assert!(!issue.is_pull_request);
        assert_eq!(issue.is_mergeable(), Tristate::Unknown);
        assert!(!issue.has_label("lgtm"));
    }
}
