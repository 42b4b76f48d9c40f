//! Re-running stale green CI.
//!
//! The decision ([`StaleGreenCi::evaluate_at`]) is pure. Acting on it
//! ([`StaleGreenCi::run`]) posts the retest comment and waits for the required
//! contexts to go pending, through the injected [`GitHubInterpreter`].
//!
//! # Gates
//!
//! Each gate short-circuits to a no-op before anything is written:
//!
//! | Gate | Skip reason |
//! |------|-------------|
//! | Not a pull request | `NotPullRequest` |
//! | No approval label | `NotApproved` |
//! | Carries an opt-out label | `RetestNotRequired` |
//! | Mergeability unknown or false | `NotMergeable` |
//! | Required contexts not known-green | `StatusNotGreen` |
//!
//! Past the gates, required contexts are scanned in order. The first context
//! whose time is unknown aborts the evaluation; the first context older than
//! the threshold triggers the retest.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{PrNumber, PrSnapshot};

use super::StaleGreenCi;
use super::staleness::is_status_stale;

/// Why the policy left a PR alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotPullRequest,
    NotApproved,
    RetestNotRequired,
    NotMergeable,
    StatusNotGreen,
    /// Every required context is green and recent enough.
    StatusesFresh,
}

/// What the policy decided for a PR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetestDecision {
    NoOp(SkipReason),

    /// Request a retest.
    RequestRetest {
        /// The first required context found stale.
        context: String,
        /// How old that context's status was.
        age: TimeDelta,
    },
}

/// What happened when the decision was carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetestOutcome {
    Skipped(SkipReason),

    /// The retest comment was posted.
    Retriggered {
        context: String,
        age: TimeDelta,
        /// False if the wait for pending timed out.
        started: bool,
    },
}

/// Errors that stop an evaluation. None of them outlive the PR they concern.
#[derive(Debug, Error)]
pub enum RetestError {
    /// A required context is green but its time is not known.
    #[error("{pr}: unable to determine time {context:?} context was set")]
    UnknownStatusTime { pr: PrNumber, context: String },

    /// Posting the retest comment failed. Nothing else was attempted.
    #[error("{pr}: failed to write retest comment: {message}")]
    PostComment { pr: PrNumber, message: String },

    /// The comment was posted but waiting for pending failed.
    #[error("{pr}: failed waiting for PR to start testing: {message}")]
    WaitForPending { pr: PrNumber, message: String },

    /// The interpreter answered with a response for a different effect.
    #[error("{pr}: unexpected response to {effect}: {response}")]
    UnexpectedResponse {
        pr: PrNumber,
        effect: &'static str,
        response: String,
    },
}

impl StaleGreenCi {
    /// Decides whether `pr` needs a retest right now.
    pub fn evaluate(
        &self,
        pr: &PrSnapshot,
        required_contexts: &[String],
    ) -> Result<RetestDecision, RetestError> {
        self.evaluate_at(pr, required_contexts, Utc::now())
    }

    /// Decides whether `pr` needs a retest as of `now`.
    pub fn evaluate_at(
        &self,
        pr: &PrSnapshot,
        required_contexts: &[String],
        now: DateTime<Utc>,
    ) -> Result<RetestDecision, RetestError> {
        if let Some(reason) = self.gate(pr, required_contexts) {
            return Ok(RetestDecision::NoOp(reason));
        }

        for context in required_contexts {
            let status_time =
                pr.status_time(context)
                    .ok_or_else(|| RetestError::UnknownStatusTime {
                        pr: pr.number,
                        context: context.clone(),
                    })?;

            if is_status_stale(status_time, now) {
                return Ok(RetestDecision::RequestRetest {
                    context: context.clone(),
                    age: now.signed_duration_since(status_time),
                });
            }
        }

        Ok(RetestDecision::NoOp(SkipReason::StatusesFresh))
    }

    fn gate(&self, pr: &PrSnapshot, required_contexts: &[String]) -> Option<SkipReason> {
        let labels = self.labels();

        if !pr.is_pull_request {
            return Some(SkipReason::NotPullRequest);
        }
        if !pr.has_label(&labels.approved) {
            return Some(SkipReason::NotApproved);
        }
        if pr.has_label(&labels.retest_not_required)
            || pr.has_label(&labels.retest_not_required_docs_only)
        {
            return Some(SkipReason::RetestNotRequired);
        }
        if !pr.is_mergeable().is_yes() {
            return Some(SkipReason::NotMergeable);
        }
        if !pr.is_status_success(required_contexts).is_yes() {
            return Some(SkipReason::StatusNotGreen);
        }
        None
    }

    /// Evaluates `pr` and, if its green results are stale, requests a retest.
    ///
    /// At most one comment is posted. If posting fails the wait is skipped;
    /// neither step is retried here, the next sweep starts over. Errors are
    /// returned unlogged for the caller to report.
    #[instrument(skip_all, fields(pr = %pr.number))]
    pub async fn run<G: GitHubInterpreter>(
        &self,
        pr: &PrSnapshot,
        required_contexts: &[String],
        github: &G,
    ) -> Result<RetestOutcome, RetestError> {
        let decision = self.evaluate(pr, required_contexts)?;
        self.apply(pr.number, decision, required_contexts, github).await
    }

    /// Carries out a decision made by [`evaluate_at`](Self::evaluate_at).
    pub async fn apply<G: GitHubInterpreter>(
        &self,
        pr: PrNumber,
        decision: RetestDecision,
        required_contexts: &[String],
        github: &G,
    ) -> Result<RetestOutcome, RetestError> {
        let (context, age) = match decision {
            RetestDecision::NoOp(reason) => {
                debug!(%pr, ?reason, "No retest needed");
                return Ok(RetestOutcome::Skipped(reason));
            }
            RetestDecision::RequestRetest { context, age } => (context, age),
        };

        info!(
            %pr,
            context = %context,
            age_hours = age.num_hours(),
            "Green CI is stale, requesting retest"
        );

        let post = GitHubEffect::PostComment {
            pr,
            body: self.message().to_string(),
        };
        match github.interpret(post).await {
            Ok(GitHubResponse::CommentPosted { .. }) => {}
            Ok(other) => return Err(unexpected(pr, "post_comment", other)),
            Err(e) => {
                error!(%pr, error = %e, "Failed to write retrigger old test comment");
                return Err(RetestError::PostComment {
                    pr,
                    message: e.to_string(),
                });
            }
        }

        let wait = GitHubEffect::WaitForPending {
            pr,
            contexts: required_contexts.to_vec(),
        };
        let started = match github.interpret(wait).await {
            Ok(GitHubResponse::PendingReached) => true,
            Ok(GitHubResponse::PendingTimedOut) => {
                error!(%pr, "Timed out waiting for PR to start testing");
                false
            }
            Ok(other) => return Err(unexpected(pr, "wait_for_pending", other)),
            Err(e) => {
                error!(%pr, error = %e, "Failed waiting for PR to start testing");
                return Err(RetestError::WaitForPending {
                    pr,
                    message: e.to_string(),
                });
            }
        };

        Ok(RetestOutcome::Retriggered {
            context,
            age,
            started,
        })
    }
}

fn unexpected(pr: PrNumber, effect: &'static str, response: GitHubResponse) -> RetestError {
    RetestError::UnexpectedResponse {
        pr,
        effect,
        response: format!("{response:?}"),
    }
}
