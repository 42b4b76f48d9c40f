//! The stale green CI policy.
//!
//! Approved, mergeable pull requests whose required contexts are all green but
//! were last run more than [`STALE_GREEN_CI_HOURS`] ago get a retest request
//! comment. Once CI has rerun, that comment is obsolete and can be pruned.
//!
//! # Components
//!
//! - [`retrigger`]: decides whether to request a retest and performs it
//! - [`stale_comments`]: decides whether a previous retest comment is obsolete
//! - [`staleness`]: the time predicates both of them share
//! - [`message`]: the canonical comment body both of them key on
//!
//! Neither component holds state between calls. Duplicate retests are avoided
//! because a retest resets the status timestamps the decision is based on.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

pub mod message;
pub mod retrigger;
pub mod stale_comments;
pub mod staleness;

pub use message::retest_message;
pub use retrigger::{RetestDecision, RetestError, RetestOutcome, SkipReason};

/// Green results older than this many hours are no longer trusted.
pub const STALE_GREEN_CI_HOURS: i64 = 96;

/// Tolerance between a status being set and a comment being posted.
pub const COMMENT_GRACE_MINUTES: i64 = 30;

/// [`STALE_GREEN_CI_HOURS`] as a duration.
pub fn staleness_threshold() -> TimeDelta {
    TimeDelta::hours(STALE_GREEN_CI_HOURS)
}

/// [`COMMENT_GRACE_MINUTES`] as a duration.
pub fn comment_grace_window() -> TimeDelta {
    TimeDelta::minutes(COMMENT_GRACE_MINUTES)
}

/// Who the bot is on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    /// The login the bot posts comments as.
    pub login: String,

    /// The CI bot mentioned to trigger a retest (without the `@`).
    pub retest_mention: String,
}

impl BotIdentity {
    pub fn new(login: impl Into<String>, retest_mention: impl Into<String>) -> Self {
        BotIdentity {
            login: login.into(),
            retest_mention: retest_mention.into(),
        }
    }
}

impl Default for BotIdentity {
    fn default() -> Self {
        BotIdentity::new("k8s-merge-robot", "k8s-bot")
    }
}

/// Label names the policy gates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLabels {
    /// Maintainers' sign-off. PRs without it are never retested.
    pub approved: String,

    /// Opt-out: the PR does not need a fresh run.
    pub retest_not_required: String,

    /// Opt-out for docs-only changes.
    pub retest_not_required_docs_only: String,
}

impl Default for PolicyLabels {
    fn default() -> Self {
        PolicyLabels {
            approved: "lgtm".to_string(),
            retest_not_required: "retest-not-required".to_string(),
            retest_not_required_docs_only: "retest-not-required-docs-only".to_string(),
        }
    }
}

/// The configured policy.
///
/// Required contexts are deliberately not stored here: callers pass the
/// current set on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleGreenCi {
    identity: BotIdentity,
    labels: PolicyLabels,
    message: String,
}

impl StaleGreenCi {
    pub fn new(identity: BotIdentity, labels: PolicyLabels) -> Self {
        let message = retest_message(&identity.retest_mention);
        StaleGreenCi {
            identity,
            labels,
            message,
        }
    }

    /// The name the policy logs under.
    pub fn name(&self) -> &'static str {
        "stale-green-ci"
    }

    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    pub fn labels(&self) -> &PolicyLabels {
        &self.labels
    }

    /// The exact body of the retest comment this policy posts.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for StaleGreenCi {
    fn default() -> Self {
        StaleGreenCi::new(BotIdentity::default(), PolicyLabels::default())
    }
}
