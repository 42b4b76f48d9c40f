//! Commit status types and the aggregate rule over required contexts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state of a single commit status context, as GitHub reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
    Error,
}

impl StatusState {
    /// Returns true for `failure` and `error`.
    pub fn is_failed(&self) -> bool {
        matches!(self, StatusState::Failure | StatusState::Error)
    }
}

/// The latest status reported for one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStatus {
    pub state: StatusState,

    /// When the status was last set. `None` if the source didn't say.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContextStatus {
    pub fn new(state: StatusState, updated_at: Option<DateTime<Utc>>) -> Self {
        ContextStatus { state, updated_at }
    }
}

/// The combined state of a set of required contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateStatus {
    /// Every required context succeeded.
    Success,
    /// Nothing has failed, but at least one context is pending or not reported.
    Pending,
    /// At least one required context failed or errored.
    Failure,
}

/// Combines the statuses of `contexts`.
///
/// Failure takes precedence over pending. A context with no reported status
/// counts as pending: CI may simply not have picked the commit up yet.
pub fn aggregate_status(
    statuses: &BTreeMap<String, ContextStatus>,
    contexts: &[String],
) -> AggregateStatus {
    let mut pending = false;
    for context in contexts {
        match statuses.get(context).map(|s| s.state) {
            Some(state) if state.is_failed() => return AggregateStatus::Failure,
            Some(StatusState::Success) => {}
            _ => pending = true,
        }
    }

    if pending {
        AggregateStatus::Pending
    } else {
        AggregateStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(entries: &[(&str, StatusState)]) -> BTreeMap<String, ContextStatus> {
        entries
            .iter()
            .map(|(ctx, state)| (ctx.to_string(), ContextStatus::new(*state, None)))
            .collect()
    }

    fn contexts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_success_is_success() {
        let s = statuses(&[
            ("ci/build", StatusState::Success),
            ("ci/test", StatusState::Success),
        ]);
        assert_eq!(
            aggregate_status(&s, &contexts(&["ci/build", "ci/test"])),
            AggregateStatus::Success
        );
    }

    #[test]
    fn failure_beats_pending() {
        let s = statuses(&[
            ("ci/build", StatusState::Pending),
            ("ci/test", StatusState::Error),
        ]);
        assert_eq!(
            aggregate_status(&s, &contexts(&["ci/build", "ci/test"])),
            AggregateStatus::Failure
        );
    }

    #[test]
    fn missing_context_is_pending() {
        let s = statuses(&[("ci/build", StatusState::Success)]);
        assert_eq!(
            aggregate_status(&s, &contexts(&["ci/build", "ci/test"])),
            AggregateStatus::Pending
        );
    }

    #[test]
    fn unrequired_contexts_are_ignored() {
        let s = statuses(&[
            ("ci/build", StatusState::Success),
            ("ci/optional", StatusState::Failure),
        ]);
        assert_eq!(
            aggregate_status(&s, &contexts(&["ci/build"])),
            AggregateStatus::Success
        );
    }

    #[test]
    fn state_serde_is_lowercase() {
        let parsed: StatusState = serde_json::from_str("\"failure\"").unwrap();
        assert_eq!(parsed, StatusState::Failure);
        assert_eq!(
            serde_json::to_string(&StatusState::Pending).unwrap(),
            "\"pending\""
        );
    }
}
